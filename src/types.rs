use serde::{Deserialize, Serialize};

/// A geographic point, optionally labelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Location {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            address: None,
            name: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Compares coordinates only. Labels are ignored.
    pub fn approx_eq(&self, other: &Location, tolerance: f64) -> bool {
        (self.lat - other.lat).abs() <= tolerance && (self.lng - other.lng).abs() <= tolerance
    }

    /// `"lat,lng"`, the form directions services expect for origin/destination.
    pub fn to_query_pair(&self) -> String {
        format!("{},{}", self.lat, self.lng)
    }

    /// Best human-readable label, falling back to empty.
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.address.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Maneuver {
    Straight,
    TurnLeft,
    TurnRight,
    Arrive,
}

impl Maneuver {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Straight => "straight",
            Self::TurnLeft => "turn-left",
            Self::TurnRight => "turn-right",
            Self::Arrive => "arrive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Driving,
    #[default]
    Transit,
}

/// One navigable step, after normalization from either upstream shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    pub instruction: String,
    /// Distance text for driving steps; the fare text (`"<price> NGN"`) for transit steps.
    pub distance: String,
    pub duration: String,
    pub coordinates: Location,
    pub maneuver: Maneuver,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Parsed leg price in NGN. Only transit steps carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fare: Option<u64>,
}

/// Progress of a step relative to the navigator's current index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Done,
    Current,
    Upcoming,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Done => "done",
            Self::Current => "current",
            Self::Upcoming => "upcoming",
        }
    }
}

/// Where the route currently held by the navigator came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteOrigin {
    Live,
    Fallback,
}
