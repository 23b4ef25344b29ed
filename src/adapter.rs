//! Turns upstream route payloads into one normalized step sequence.

use serde::Serialize;

use crate::error::NavError;
use crate::markup::strip_tags;
use crate::route::Route;
use crate::types::{Location, Maneuver, RouteStep, TravelMode};
use crate::upstream::{DirectionsStep, RoutePayload, TransitResponse, TransportLeg};

/// Classify a driving instruction. Checks run in priority order and the first match wins.
pub fn classify_maneuver(instruction: &str) -> Maneuver {
    let lower = instruction.to_lowercase();
    if lower.contains("turn right") || lower.contains("right turn") {
        Maneuver::TurnRight
    } else if lower.contains("turn left") || lower.contains("left turn") {
        Maneuver::TurnLeft
    } else if lower.contains("arrive") || lower.contains("destination") {
        Maneuver::Arrive
    } else {
        Maneuver::Straight
    }
}

/// Normalize turn-by-turn driving steps, preserving their order.
pub fn normalize_driving(raw_steps: &[DirectionsStep]) -> Vec<RouteStep> {
    let mut steps: Vec<RouteStep> = raw_steps
        .iter()
        .map(|step| {
            let instruction = strip_tags(&step.html_instructions);
            RouteStep {
                maneuver: classify_maneuver(&instruction),
                instruction,
                distance: step.distance.text.clone(),
                duration: step.duration.text.clone(),
                coordinates: step.end_location.into(),
                notes: None,
                fare: None,
            }
        })
        .collect();
    seal_arrival(&mut steps);
    steps
}

/// Only the final step may be `Arrive`, and it always is.
fn seal_arrival(steps: &mut [RouteStep]) {
    let Some((last, rest)) = steps.split_last_mut() else {
        return;
    };
    for step in rest {
        if step.maneuver == Maneuver::Arrive {
            step.maneuver = Maneuver::Straight;
        }
    }
    last.maneuver = Maneuver::Arrive;
}

/// Output of transit normalization: the steps plus any fields that had to be defaulted.
#[derive(Debug, Default)]
pub struct Normalized {
    pub steps: Vec<RouteStep>,
    pub warnings: Vec<NavError>,
}

/// Normalize transit legs into steps.
///
/// Each step sits at its leg's start, except the last, which sits at its leg's stop so
/// that the final waypoint is the destination. Unparsable numbers become zero and are
/// reported in `warnings`; they never stop the remaining legs from being normalized.
pub fn normalize_transit(legs: &[TransportLeg]) -> Normalized {
    let mut out = Normalized::default();
    let last_index = legs.len().saturating_sub(1);

    for (i, leg) in legs.iter().enumerate() {
        let is_last = i == last_index;
        let price = parse_price(i, &leg.price, &mut out.warnings);
        let coordinates = if is_last {
            Location::new(
                parse_coordinate(i, "stop_lat", &leg.stop_lat, &mut out.warnings),
                parse_coordinate(i, "stop_long", &leg.stop_long, &mut out.warnings),
            )
            .with_address(leg.stop.clone())
        } else {
            Location::new(
                parse_coordinate(i, "start_lat", &leg.start_lat, &mut out.warnings),
                parse_coordinate(i, "start_long", &leg.start_long, &mut out.warnings),
            )
            .with_address(leg.start.clone())
        };
        let duration = match leg.duration.as_deref().map(str::trim) {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => "N/A".to_string(),
        };

        out.steps.push(RouteStep {
            instruction: format!(
                "{}: {} → {}",
                leg.type_of_vehicle.to_uppercase(),
                leg.start,
                leg.stop
            ),
            distance: fare_text(price),
            duration,
            coordinates,
            maneuver: if is_last {
                Maneuver::Arrive
            } else {
                Maneuver::Straight
            },
            notes: Some(leg.notes.clone()).filter(|n| !n.is_empty()),
            fare: Some(price),
        });
    }

    for warning in &out.warnings {
        log::warn!("{warning}; using 0");
    }
    out
}

/// Canonical fare text carried in a transit step's `distance` field.
pub fn fare_text(price: u64) -> String {
    format!("{price} NGN")
}

/// Leading-integer parse, the way fares are quoted (`"150"`, `"150 naira"`).
pub fn leading_integer(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..digits_end].parse().ok()
}

fn parse_price(leg: usize, raw: &str, warnings: &mut Vec<NavError>) -> u64 {
    leading_integer(raw).unwrap_or_else(|| {
        warnings.push(NavError::MalformedLegData {
            leg,
            field: "price",
            value: raw.to_string(),
        });
        0
    })
}

fn parse_coordinate(leg: usize, field: &'static str, raw: &str, warnings: &mut Vec<NavError>) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            warnings.push(NavError::MalformedLegData {
                leg,
                field,
                value: raw.to_string(),
            });
            0.0
        }
    }
}

fn lenient_coordinate(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// The start/stop chain of a transit trip, for drawing the line a rider follows.
///
/// With `dedupe` set, a point identical to the previously appended one is skipped, so
/// back-to-back legs sharing a stop contribute that stop once.
pub fn transit_polyline(legs: &[TransportLeg], dedupe: bool) -> Vec<Location> {
    let mut points: Vec<Location> = Vec::with_capacity(legs.len() * 2);
    for leg in legs {
        let ends = [
            (&leg.start, &leg.start_lat, &leg.start_long),
            (&leg.stop, &leg.stop_lat, &leg.stop_long),
        ];
        for (name, lat, lng) in ends {
            let point =
                Location::new(lenient_coordinate(lat), lenient_coordinate(lng)).with_address(name.clone());
            let repeats_previous = points
                .last()
                .is_some_and(|prev| prev.lat == point.lat && prev.lng == point.lng);
            if dedupe && repeats_previous {
                continue;
            }
            points.push(point);
        }
    }
    points
}

/// One way of making a transit trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitAlternative {
    pub label: String,
    pub legs: Vec<TransportLeg>,
    pub total_cost: u64,
}

impl TransitAlternative {
    fn new(label: impl Into<String>, legs: Vec<TransportLeg>) -> Self {
        let total_cost = legs
            .iter()
            .map(|leg| leading_integer(&leg.price).unwrap_or(0))
            .fold(0, u64::saturating_add);
        Self {
            label: label.into(),
            legs,
            total_cost,
        }
    }
}

/// Resolve either response shape into a list of alternatives. Empty alternatives are dropped.
pub fn resolve_alternatives(response: TransitResponse) -> Vec<TransitAlternative> {
    let candidates = match response {
        TransitResponse::Alternatives { routes_a, routes_b } => vec![
            TransitAlternative::new("Danfo", routes_a),
            TransitAlternative::new("BRT", routes_b),
        ],
        TransitResponse::Flat(legs) => {
            let label = legs
                .first()
                .map(|leg| leg.type_of_vehicle.to_uppercase())
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| "Transit".to_string());
            vec![TransitAlternative::new(label, legs)]
        }
    };
    candidates.into_iter().filter(|alt| !alt.legs.is_empty()).collect()
}

/// A route built from a payload, plus the transit alternatives it was chosen from.
#[derive(Debug)]
pub struct ResolvedRoute {
    pub route: Route,
    pub alternatives: Vec<TransitAlternative>,
    pub warnings: Vec<NavError>,
}

/// Build the route for `payload`. Transit payloads use alternative `selected`, or the
/// first one when that index does not exist.
pub fn resolve_payload(payload: RoutePayload, selected: usize) -> Result<ResolvedRoute, NavError> {
    match payload {
        RoutePayload::Driving(response) => {
            let steps = normalize_driving(&response.into_steps()?);
            if steps.is_empty() {
                return Err(NavError::RouteEmpty);
            }
            Ok(ResolvedRoute {
                route: Route::new(TravelMode::Driving, steps),
                alternatives: Vec::new(),
                warnings: Vec::new(),
            })
        }
        RoutePayload::Transit(response) => {
            let alternatives = resolve_alternatives(response);
            let chosen = alternatives
                .get(selected)
                .or_else(|| alternatives.first())
                .ok_or(NavError::RouteEmpty)?;
            let Normalized { steps, warnings } = normalize_transit(&chosen.legs);
            Ok(ResolvedRoute {
                route: Route::new(TravelMode::Transit, steps),
                alternatives,
                warnings,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::{LatLng, TextValue};

    fn driving_step(html: &str, lat: f64, lng: f64) -> DirectionsStep {
        DirectionsStep {
            html_instructions: html.to_string(),
            distance: TextValue {
                text: "0.3 km".to_string(),
            },
            duration: TextValue {
                text: "1 min".to_string(),
            },
            end_location: LatLng { lat, lng },
        }
    }

    fn leg(start: &str, stop: &str, from: (&str, &str), to: (&str, &str), price: &str) -> TransportLeg {
        TransportLeg {
            start: start.to_string(),
            stop: stop.to_string(),
            start_lat: from.0.to_string(),
            start_long: from.1.to_string(),
            stop_lat: to.0.to_string(),
            stop_long: to.1.to_string(),
            price: price.to_string(),
            type_of_vehicle: "danfo".to_string(),
            notes: String::new(),
            duration: None,
        }
    }

    #[test]
    fn test_classification_priority() {
        assert_eq!(classify_maneuver("Turn right onto Main St"), Maneuver::TurnRight);
        assert_eq!(classify_maneuver("Make a RIGHT TURN"), Maneuver::TurnRight);
        assert_eq!(classify_maneuver("Turn left at the roundabout"), Maneuver::TurnLeft);
        assert_eq!(classify_maneuver("Destination will be on the right"), Maneuver::Arrive);
        assert_eq!(classify_maneuver("Head north"), Maneuver::Straight);
        // right wins over left and arrive
        assert_eq!(
            classify_maneuver("Turn right, then turn left to arrive"),
            Maneuver::TurnRight
        );
    }

    #[test]
    fn test_driving_strips_markup_and_keeps_order() {
        let raw = vec![
            driving_step("Turn <b>right</b> onto Main St", 6.50, 3.37),
            driving_step("Head <b>north</b>", 6.51, 3.38),
        ];
        let steps = normalize_driving(&raw);
        assert_eq!(steps[0].instruction, "Turn right onto Main St");
        assert_eq!(steps[0].maneuver, Maneuver::TurnRight);
        assert_eq!(steps[0].coordinates, Location::new(6.50, 3.37));
        assert_eq!(steps[1].instruction, "Head north");
        assert_eq!(steps[1].maneuver, Maneuver::Arrive);
        assert_eq!(steps[1].fare, None);
    }

    #[test]
    fn test_driving_turns_classified_after_markup_removed() {
        let raw = vec![
            driving_step("Turn <b>left</b> onto <b>Ikorodu Rd</b>", 6.50, 3.37),
            driving_step("Make a <b>right</b> turn at Yaba", 6.51, 3.38),
            driving_step("Turn <b>right</b> onto Main St", 6.52, 3.39),
            driving_step("Continue", 6.53, 3.40),
        ];
        let maneuvers: Vec<Maneuver> = normalize_driving(&raw).iter().map(|s| s.maneuver).collect();
        assert_eq!(
            maneuvers,
            vec![Maneuver::TurnLeft, Maneuver::TurnRight, Maneuver::TurnRight, Maneuver::Arrive]
        );
    }

    #[test]
    fn test_driving_arrive_only_at_end() {
        let raw = vec![
            driving_step("Your destination is near", 6.50, 3.37),
            driving_step("Continue", 6.51, 3.38),
            driving_step("Turn left", 6.52, 3.39),
        ];
        let maneuvers: Vec<Maneuver> = normalize_driving(&raw).iter().map(|s| s.maneuver).collect();
        assert_eq!(
            maneuvers,
            vec![Maneuver::Straight, Maneuver::Straight, Maneuver::Arrive]
        );
    }

    #[test]
    fn test_empty_inputs() {
        assert!(normalize_driving(&[]).is_empty());
        let out = normalize_transit(&[]);
        assert!(out.steps.is_empty());
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_transit_start_unless_last() {
        let legs = vec![
            leg("A", "B", ("1", "1"), ("2", "2"), "100"),
            leg("B", "C", ("2", "2"), ("3", "3"), "150"),
            leg("C", "D", ("3", "3"), ("4", "4"), "50"),
        ];
        let out = normalize_transit(&legs);
        let coords: Vec<(f64, f64)> = out
            .steps
            .iter()
            .map(|s| (s.coordinates.lat, s.coordinates.lng))
            .collect();
        assert_eq!(coords, vec![(1.0, 1.0), (2.0, 2.0), (4.0, 4.0)]);
        assert_eq!(out.steps[2].coordinates.address.as_deref(), Some("D"));
        assert_eq!(out.steps[0].instruction, "DANFO: A → B");
        assert_eq!(out.steps[0].distance, "100 NGN");
        assert_eq!(out.steps[0].duration, "N/A");
        assert_eq!(out.steps[0].maneuver, Maneuver::Straight);
        assert_eq!(out.steps[2].maneuver, Maneuver::Arrive);
    }

    #[test]
    fn test_single_leg_uses_stop() {
        let out = normalize_transit(&[leg("A", "B", ("1", "1"), ("2", "2"), "100")]);
        assert_eq!(out.steps.len(), 1);
        assert_eq!(out.steps[0].coordinates.lat, 2.0);
        assert_eq!(out.steps[0].maneuver, Maneuver::Arrive);
    }

    #[test]
    fn test_malformed_fields_default_to_zero() {
        let legs = vec![
            leg("A", "B", ("abc", "1"), ("2", "2"), "free"),
            leg("B", "C", ("2", "2"), ("NaN", ""), "200"),
        ];
        let out = normalize_transit(&legs);
        assert_eq!(out.steps.len(), 2);
        assert_eq!(out.steps[0].coordinates.lat, 0.0);
        assert_eq!(out.steps[0].fare, Some(0));
        assert_eq!(out.steps[0].distance, "0 NGN");
        assert_eq!(out.steps[1].coordinates.lat, 0.0);
        assert_eq!(out.steps[1].coordinates.lng, 0.0);
        assert_eq!(out.steps[1].fare, Some(200));

        let fields: Vec<&str> = out
            .warnings
            .iter()
            .map(|w| match w {
                NavError::MalformedLegData { field, .. } => *field,
                other => panic!("Unexpected warning {other:?}"),
            })
            .collect();
        assert_eq!(fields, vec!["price", "start_lat", "stop_lat", "stop_long"]);
    }

    #[test]
    fn test_duration_carried_when_present() {
        let mut l = leg("A", "B", ("1", "1"), ("2", "2"), "100");
        l.duration = Some("25 mins".to_string());
        l.notes = "Board yellow bus".to_string();
        let out = normalize_transit(&[l]);
        assert_eq!(out.steps[0].duration, "25 mins");
        assert_eq!(out.steps[0].notes.as_deref(), Some("Board yellow bus"));
    }

    #[test]
    fn test_leading_integer() {
        assert_eq!(leading_integer("100"), Some(100));
        assert_eq!(leading_integer(" 150 naira"), Some(150));
        assert_eq!(leading_integer("0"), Some(0));
        assert_eq!(leading_integer("₦100"), None);
        assert_eq!(leading_integer(""), None);
        assert_eq!(leading_integer("-5"), None);
    }

    #[test]
    fn test_polyline_dedupe_policy() {
        let legs = vec![
            leg("A", "B", ("1", "1"), ("2", "2"), "0"),
            leg("B", "C", ("2", "2"), ("3", "3"), "0"),
        ];
        let deduped = transit_polyline(&legs, true);
        let names: Vec<&str> = deduped.iter().map(|p| p.label()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);

        let raw = transit_polyline(&legs, false);
        let names: Vec<&str> = raw.iter().map(|p| p.label()).collect();
        assert_eq!(names, vec!["A", "B", "B", "C"]);
    }

    #[test]
    fn test_polyline_keeps_gaps_between_legs() {
        // a walk between B and B' means the points differ and both stay
        let legs = vec![
            leg("A", "B", ("1", "1"), ("2", "2"), "0"),
            leg("B'", "C", ("2.001", "2"), ("3", "3"), "0"),
        ];
        assert_eq!(transit_polyline(&legs, true).len(), 4);
    }

    #[test]
    fn test_alternatives_resolved_and_empty_dropped() {
        let response = TransitResponse::Alternatives {
            routes_a: vec![
                leg("A", "B", ("1", "1"), ("2", "2"), "100"),
                leg("B", "C", ("2", "2"), ("3", "3"), "oops"),
            ],
            routes_b: Vec::new(),
        };
        let alts = resolve_alternatives(response);
        assert_eq!(alts.len(), 1);
        assert_eq!(alts[0].label, "Danfo");
        assert_eq!(alts[0].total_cost, 100);
    }

    #[test]
    fn test_huge_fares_saturate() {
        let response = TransitResponse::Flat(vec![
            leg("A", "B", ("1", "1"), ("2", "2"), "18446744073709551615"),
            leg("B", "C", ("2", "2"), ("3", "3"), "1"),
        ]);
        let alts = resolve_alternatives(response);
        assert_eq!(alts[0].total_cost, u64::MAX);

        let resolved = resolve_payload(RoutePayload::Transit(TransitResponse::Flat(alts[0].legs.clone())), 0).unwrap();
        assert_eq!(resolved.route.total_cost(), Some(u64::MAX));
    }

    #[test]
    fn test_resolve_payload_selection_falls_back_to_first() {
        let response = TransitResponse::Flat(vec![leg("A", "B", ("1", "1"), ("2", "2"), "100")]);
        let resolved = resolve_payload(RoutePayload::Transit(response), 7).unwrap();
        assert_eq!(resolved.alternatives[0].label, "DANFO");
        assert_eq!(resolved.route.step_count(), 1);
        assert_eq!(resolved.route.mode(), TravelMode::Transit);
    }

    #[test]
    fn test_resolve_payload_empty_transit() {
        let result = resolve_payload(RoutePayload::Transit(TransitResponse::Flat(Vec::new())), 0);
        assert!(matches!(result, Err(NavError::RouteEmpty)));
    }
}
