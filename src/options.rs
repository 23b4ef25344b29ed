use serde::Deserialize;

use crate::types::{Location, TravelMode};

/// Options for a navigator instance.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigatorOptions {
    /// Which upstream service computes routes (default: transit)
    #[serde(default)]
    pub travel_mode: TravelMode,

    /// Skip a transit polyline point equal to the previously appended one (default: true)
    #[serde(default = "default_true")]
    pub dedupe_transit_stops: bool,

    /// Degrees of lat/lng spanning half the drawing surface (default: 0.01)
    #[serde(default = "default_map_range")]
    pub map_range_degrees: f64,

    /// Movement below this many degrees is not a new position (default: 0.00001)
    #[serde(default = "default_move_tolerance")]
    pub move_tolerance_degrees: f64,

    /// Where to pretend the user is when no fix can be obtained (default: Sabo Market, Yaba)
    #[serde(default = "default_fallback_location")]
    pub fallback_location: Location,

    /// Upper bound on place search candidates (default: 5)
    #[serde(default = "default_max_place_results")]
    pub max_place_results: usize,

    #[serde(default)]
    pub endpoints: ServiceEndpoints,
}

impl Default for NavigatorOptions {
    fn default() -> Self {
        Self {
            travel_mode: TravelMode::default(),
            dedupe_transit_stops: true,
            map_range_degrees: default_map_range(),
            move_tolerance_degrees: default_move_tolerance(),
            fallback_location: default_fallback_location(),
            max_place_results: default_max_place_results(),
            endpoints: ServiceEndpoints::default(),
        }
    }
}

/// Where the external services live. An empty endpoint means "always use the fallback".
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEndpoints {
    #[serde(default = "default_directions_endpoint")]
    pub directions: String,
    #[serde(default)]
    pub transit: String,
    #[serde(default = "default_autocomplete_endpoint")]
    pub place_autocomplete: String,
    #[serde(default = "default_place_details_endpoint")]
    pub place_details: String,
    #[serde(default)]
    pub api_key: String,
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            directions: default_directions_endpoint(),
            transit: String::new(),
            place_autocomplete: default_autocomplete_endpoint(),
            place_details: default_place_details_endpoint(),
            api_key: String::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_map_range() -> f64 {
    0.01
}

fn default_move_tolerance() -> f64 {
    0.00001
}

fn default_fallback_location() -> Location {
    Location::new(6.5194, 3.3792).with_name("Sabo Market")
}

fn default_max_place_results() -> usize {
    5
}

fn default_directions_endpoint() -> String {
    "https://maps.googleapis.com/maps/api/directions/json".to_string()
}

fn default_autocomplete_endpoint() -> String {
    "https://maps.googleapis.com/maps/api/place/autocomplete/json".to_string()
}

fn default_place_details_endpoint() -> String {
    "https://maps.googleapis.com/maps/api/place/details/json".to_string()
}
