use wasm_bindgen::JsValue;

#[derive(Debug)]
pub enum NavError {
    LocationPermissionDenied,
    LocationUnavailable,
    LocationTimeout,
    RouteRequestFailed {
        reason: String,
    },
    RouteEmpty,
    MalformedLegData {
        leg: usize,
        field: &'static str,
        value: String,
    },
    PlaceSearchFailed {
        reason: String,
    },
}

impl NavError {
    pub fn request_failed(reason: impl Into<String>) -> Self {
        Self::RouteRequestFailed {
            reason: reason.into(),
        }
    }

    /// Stable identifier for the error kind, used by the JS host to pick a notification.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LocationPermissionDenied => "LocationPermissionDenied",
            Self::LocationUnavailable => "LocationUnavailable",
            Self::LocationTimeout => "LocationTimeout",
            Self::RouteRequestFailed { .. } => "RouteRequestFailed",
            Self::RouteEmpty => "RouteEmpty",
            Self::MalformedLegData { .. } => "MalformedLegData",
            Self::PlaceSearchFailed { .. } => "PlaceSearchFailed",
        }
    }
}

impl std::fmt::Display for NavError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LocationPermissionDenied => write!(f, "Location permission denied"),
            Self::LocationUnavailable => write!(f, "Location unavailable"),
            Self::LocationTimeout => write!(f, "Timed out waiting for a location fix"),
            Self::RouteRequestFailed { reason } => write!(f, "Route request failed: {reason}"),
            Self::RouteEmpty => write!(f, "Route response contained no steps"),
            Self::MalformedLegData { leg, field, value } => {
                write!(f, "Malformed value '{value}' for '{field}' in leg {leg}")
            }
            Self::PlaceSearchFailed { reason } => write!(f, "Place search failed: {reason}"),
        }
    }
}

impl std::error::Error for NavError {}

impl From<serde_json::Error> for NavError {
    fn from(e: serde_json::Error) -> Self {
        Self::request_failed(format!("invalid response body: {e}"))
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for NavError {
    fn from(e: reqwest::Error) -> Self {
        Self::request_failed(e.to_string())
    }
}

impl From<NavError> for JsValue {
    fn from(e: NavError) -> Self {
        let err = js_sys::Error::new(&e.to_string());
        err.set_name(e.kind());
        err.into()
    }
}

/// The three ways a position request can fail in the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum LocationErrorKind {
    PermissionDenied,
    Unavailable,
    Timeout,
}

impl LocationErrorKind {
    /// Maps `GeolocationPositionError.code`. Unknown codes count as unavailable.
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            3 => Self::Timeout,
            _ => Self::Unavailable,
        }
    }
}

impl From<LocationErrorKind> for NavError {
    fn from(kind: LocationErrorKind) -> Self {
        match kind {
            LocationErrorKind::PermissionDenied => Self::LocationPermissionDenied,
            LocationErrorKind::Unavailable => Self::LocationUnavailable,
            LocationErrorKind::Timeout => Self::LocationTimeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_error_codes() {
        assert_eq!(
            LocationErrorKind::from_code(1),
            LocationErrorKind::PermissionDenied
        );
        assert_eq!(LocationErrorKind::from_code(2), LocationErrorKind::Unavailable);
        assert_eq!(LocationErrorKind::from_code(3), LocationErrorKind::Timeout);
        assert_eq!(LocationErrorKind::from_code(42), LocationErrorKind::Unavailable);
    }

    #[test]
    fn test_location_kinds_stay_distinct() {
        let kinds: Vec<&str> = [
            LocationErrorKind::PermissionDenied,
            LocationErrorKind::Unavailable,
            LocationErrorKind::Timeout,
        ]
        .into_iter()
        .map(|k| NavError::from(k).kind())
        .collect();
        assert_eq!(
            kinds,
            vec!["LocationPermissionDenied", "LocationUnavailable", "LocationTimeout"]
        );
    }

    #[test]
    fn test_display() {
        let e = NavError::MalformedLegData {
            leg: 2,
            field: "price",
            value: "abc".to_string(),
        };
        assert_eq!(e.to_string(), "Malformed value 'abc' for 'price' in leg 2");
    }
}
