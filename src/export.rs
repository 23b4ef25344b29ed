use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde_json::{Map, Value as JsonValue};

use crate::route::Route;
use crate::types::{Location, RouteStep};

/// Convert a route to a GeoJSON FeatureCollection for an embedded map widget.
///
/// The first feature is the route line (when there are at least two steps), followed by
/// one Point per step. `progress` is the current step index while navigating.
pub fn route_to_feature_collection(route: &Route, progress: Option<usize>) -> FeatureCollection {
    let mut features = Vec::with_capacity(route.step_count() + 1);

    if route.step_count() >= 2 {
        let coords: Vec<Vec<f64>> = route.steps().iter().map(|s| point_coords(&s.coordinates)).collect();
        let mut props = Map::new();
        props.insert("kind".to_string(), JsonValue::String("route".to_string()));
        props.insert(
            "mode".to_string(),
            serde_json::to_value(route.mode()).unwrap_or(JsonValue::Null),
        );
        if let Some(cost) = route.total_cost() {
            props.insert("totalCost".to_string(), JsonValue::Number(cost.into()));
        }
        features.push(feature(Value::LineString(coords), props));
    }

    for (index, step) in route.steps().iter().enumerate() {
        let mut props = step_props(step);
        props.insert("stepIndex".to_string(), JsonValue::Number(index.into()));
        props.insert(
            "status".to_string(),
            JsonValue::String(route.status_of(index, progress).as_str().to_string()),
        );
        features.push(feature(Value::Point(point_coords(&step.coordinates)), props));
    }

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// A plain LineString feature through `points`, e.g. a transit polyline.
pub fn polyline_feature(points: &[Location]) -> Option<Feature> {
    if points.len() < 2 {
        return None;
    }
    let coords = points.iter().map(point_coords).collect();
    let mut props = Map::new();
    props.insert("kind".to_string(), JsonValue::String("polyline".to_string()));
    let names: Vec<JsonValue> = points
        .iter()
        .map(|p| JsonValue::String(p.label().to_string()))
        .collect();
    props.insert("stops".to_string(), JsonValue::Array(names));
    Some(feature(Value::LineString(coords), props))
}

fn feature(value: Value, props: Map<String, JsonValue>) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(props),
        foreign_members: None,
    }
}

/// GeoJSON order: [lng, lat].
fn point_coords(location: &Location) -> Vec<f64> {
    vec![location.lng, location.lat]
}

fn step_props(step: &RouteStep) -> Map<String, JsonValue> {
    let mut props = Map::new();
    props.insert("kind".to_string(), JsonValue::String("step".to_string()));
    props.insert("instruction".to_string(), JsonValue::String(step.instruction.clone()));
    props.insert("distance".to_string(), JsonValue::String(step.distance.clone()));
    props.insert("duration".to_string(), JsonValue::String(step.duration.clone()));
    props.insert(
        "maneuver".to_string(),
        JsonValue::String(step.maneuver.as_str().to_string()),
    );
    if let Some(ref notes) = step.notes {
        props.insert("notes".to_string(), JsonValue::String(notes.clone()));
    }
    if let Some(ref address) = step.coordinates.address {
        props.insert("address".to_string(), JsonValue::String(address.clone()));
    }
    props
}
