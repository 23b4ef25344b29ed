//! Wire shapes of the external route services, exactly as they arrive.
//!
//! Nothing here is normalized. The adapter turns these into [`RouteStep`]s and the
//! rest of the crate never looks at them again.
//!
//! [`RouteStep`]: crate::types::RouteStep

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::NavError;
use crate::types::{Location, TravelMode};

/// Directions service response (Google Directions JSON layout).
#[derive(Debug, Clone, Deserialize)]
pub struct DirectionsResponse {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectionsRoute {
    #[serde(default)]
    pub legs: Vec<DirectionsLeg>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectionsLeg {
    #[serde(default)]
    pub distance: Option<TextValue>,
    #[serde(default)]
    pub duration: Option<TextValue>,
    #[serde(default)]
    pub steps: Vec<DirectionsStep>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectionsStep {
    pub html_instructions: String,
    pub distance: TextValue,
    pub duration: TextValue,
    pub end_location: LatLng,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextValue {
    pub text: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<LatLng> for Location {
    fn from(ll: LatLng) -> Self {
        Location::new(ll.lat, ll.lng)
    }
}

impl DirectionsResponse {
    /// The steps of the first route, across all of its legs, in travel order.
    ///
    /// A non-`OK` status or an empty route list is a failed request.
    pub fn into_steps(self) -> Result<Vec<DirectionsStep>, NavError> {
        if self.status != "OK" {
            let reason = self.error_message.unwrap_or(self.status);
            return Err(NavError::request_failed(reason));
        }
        let route = self
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| NavError::request_failed("No routes found"))?;
        Ok(route.legs.into_iter().flat_map(|leg| leg.steps).collect())
    }
}

/// One leg of a transit trip. Numeric fields arrive as strings and are parsed later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportLeg {
    #[serde(default, deserialize_with = "lenient_string")]
    pub start: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub stop: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_lat: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_long: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub stop_lat: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub stop_long: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub price: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub type_of_vehicle: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub notes: String,
    /// Travel time estimate, when the service provides one. Bare numbers are minutes.
    #[serde(
        default,
        alias = "time",
        alias = "eta",
        deserialize_with = "lenient_duration",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<String>,
}

/// Accept strings, numbers and null for the nominally-string leg fields.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_duration<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(format!("{n} mins")),
        other => Some(other.to_string()),
    })
}

/// Transit service response: either a single leg list or two named alternatives.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TransitResponse {
    Alternatives {
        #[serde(rename = "routesA")]
        routes_a: Vec<TransportLeg>,
        #[serde(rename = "routesB", default)]
        routes_b: Vec<TransportLeg>,
    },
    Flat(Vec<TransportLeg>),
}

/// A response body resolved to the upstream shape for its travel mode.
#[derive(Debug, Clone)]
pub enum RoutePayload {
    Driving(DirectionsResponse),
    Transit(TransitResponse),
}

/// Parse a successful response body for the given mode.
pub fn parse_payload(mode: TravelMode, body: &str) -> Result<RoutePayload, NavError> {
    Ok(match mode {
        TravelMode::Driving => RoutePayload::Driving(serde_json::from_str(body)?),
        TravelMode::Transit => RoutePayload::Transit(serde_json::from_str(body)?),
    })
}

/// Body of the transit route request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitQuery {
    #[serde(rename = "start-name")]
    pub start_name: String,
    #[serde(rename = "start-long")]
    pub start_long: f64,
    #[serde(rename = "start-lat")]
    pub start_lat: f64,
    #[serde(rename = "stop-name")]
    pub stop_name: String,
    #[serde(rename = "stop-long")]
    pub stop_long: f64,
    #[serde(rename = "stop-lat")]
    pub stop_lat: f64,
}

impl TransitQuery {
    pub fn new(origin: &Location, destination: &Location) -> Self {
        Self {
            start_name: origin.label().to_string(),
            start_long: origin.lng,
            start_lat: origin.lat,
            stop_name: destination.label().to_string(),
            stop_long: destination.lng,
            stop_lat: destination.lat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_and_alternatives_discriminated() {
        let flat = r#"[{"start":"A","stop":"B","start_lat":"1","start_long":"2","stop_lat":"3","stop_long":"4","price":"100","type_of_vehicle":"danfo","notes":""}]"#;
        match serde_json::from_str::<TransitResponse>(flat).unwrap() {
            TransitResponse::Flat(legs) => assert_eq!(legs.len(), 1),
            other => panic!("Expected flat legs, got {other:?}"),
        }

        let alts = r#"{"routesA":[],"routesB":[{"start":"A","stop":"B","price":"300","type_of_vehicle":"BRT"}]}"#;
        match serde_json::from_str::<TransitResponse>(alts).unwrap() {
            TransitResponse::Alternatives { routes_a, routes_b } => {
                assert!(routes_a.is_empty());
                assert_eq!(routes_b[0].price, "300");
                assert_eq!(routes_b[0].start_lat, "");
            }
            other => panic!("Expected alternatives, got {other:?}"),
        }
    }

    #[test]
    fn test_numeric_leg_fields_accepted() {
        let json = r#"{"start":"A","stop":"B","start_lat":6.5,"start_long":3.3,"stop_lat":null,"price":150,"type_of_vehicle":"keke","notes":"x","time":"12 mins"}"#;
        let leg: TransportLeg = serde_json::from_str(json).unwrap();
        assert_eq!(leg.start_lat, "6.5");
        assert_eq!(leg.price, "150");
        assert_eq!(leg.stop_lat, "");
        assert_eq!(leg.duration.as_deref(), Some("12 mins"));
    }

    #[test]
    fn test_numeric_duration_keeps_live_route() {
        let flat = r#"[{"start":"A","stop":"B","start_lat":"1","start_long":"2","stop_lat":"3","stop_long":"4","price":"100","type_of_vehicle":"danfo","notes":"","duration":35},
                       {"start":"B","stop":"C","price":"50","type_of_vehicle":"danfo","eta":null}]"#;
        let legs = match parse_payload(TravelMode::Transit, flat).unwrap() {
            RoutePayload::Transit(TransitResponse::Flat(legs)) => legs,
            other => panic!("Expected flat transit legs, got {other:?}"),
        };
        assert_eq!(legs[0].duration.as_deref(), Some("35 mins"));
        assert_eq!(legs[1].duration, None);
    }

    #[test]
    fn test_directions_status_checked() {
        let denied = r#"{"status":"REQUEST_DENIED","error_message":"bad key","routes":[]}"#;
        let resp: DirectionsResponse = serde_json::from_str(denied).unwrap();
        let err = resp.into_steps().unwrap_err();
        assert_eq!(err.to_string(), "Route request failed: bad key");

        let empty: DirectionsResponse =
            serde_json::from_str(r#"{"status":"OK","routes":[]}"#).unwrap();
        assert!(matches!(
            empty.into_steps(),
            Err(NavError::RouteRequestFailed { .. })
        ));
    }

    #[test]
    fn test_transit_query_field_names() {
        let q = TransitQuery::new(
            &Location::new(6.5, 3.3).with_name("Sabo"),
            &Location::new(6.6, 3.4).with_address("Ikeja"),
        );
        let v = serde_json::to_value(&q).unwrap();
        assert_eq!(v["start-name"], "Sabo");
        assert_eq!(v["stop-name"], "Ikeja");
        assert_eq!(v["start-lat"], 6.5);
        assert_eq!(v["stop-long"], 3.4);
    }

    #[test]
    fn test_parse_payload_by_mode() {
        assert!(matches!(
            parse_payload(TravelMode::Transit, "[]").unwrap(),
            RoutePayload::Transit(TransitResponse::Flat(_))
        ));
        assert!(parse_payload(TravelMode::Driving, "[]").is_err());
    }
}
