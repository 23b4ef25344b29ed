//! Built-in sample routes used when the route services cannot be reached.

use crate::route::Route;
use crate::types::{Location, Maneuver, RouteStep, TravelMode};
use crate::upstream::{TransitResponse, TransportLeg};

fn leg(
    start: &str,
    start_at: (&str, &str),
    stop: &str,
    stop_at: (&str, &str),
    price: &str,
    vehicle: &str,
    notes: &str,
) -> TransportLeg {
    TransportLeg {
        start: start.to_string(),
        stop: stop.to_string(),
        start_lat: start_at.0.to_string(),
        start_long: start_at.1.to_string(),
        stop_lat: stop_at.0.to_string(),
        stop_long: stop_at.1.to_string(),
        price: price.to_string(),
        type_of_vehicle: vehicle.to_string(),
        notes: notes.to_string(),
        duration: None,
    }
}

/// Sabo Market to Ikeja Underbridge, by danfo or by BRT.
pub fn transit_sample() -> TransitResponse {
    const SABO: (&str, &str) = ("6.5194", "3.3792");
    const YABA: (&str, &str) = ("6.5149", "3.3793");
    const OBANIKORO: (&str, &str) = ("6.5492", "3.3817");
    const PALMGROVE: (&str, &str) = ("6.5531", "3.3845");
    const IKEJA: (&str, &str) = ("6.5874", "3.3421");
    const COSTAIN: (&str, &str) = ("6.4923", "3.3789");
    const OSHODI: (&str, &str) = ("6.5218", "3.3356");

    TransitResponse::Alternatives {
        routes_a: vec![
            leg("Sabo Market", SABO, "Yaba Market", YABA, "100", "danfo", "Board yellow 'Yaba-Ojuelegba' Danfo"),
            leg("Yaba Market", YABA, "Obanikoro", OBANIKORO, "150", "danfo", "Transfer to 'Ikeja' Danfo (yellow/black stripes)"),
            leg("Obanikoro", OBANIKORO, "Palmgrove", PALMGROVE, "0", "danfo", "Stay in same vehicle"),
            leg("Palmgrove", PALMGROVE, "Ikeja Underbridge", IKEJA, "50", "danfo", "Final stop (alight at LASMA office)"),
        ],
        routes_b: vec![
            leg("Sabo Market", SABO, "Costain BRT Terminal", COSTAIN, "300", "BRT", "Board blue 'CMS-Abule Egba' BRT (Cowry card required)"),
            leg("Costain BRT Terminal", COSTAIN, "Oshodi BRT Terminal", OSHODI, "0", "BRT", "Free transfer to 'Oshodi-Ikeja' BRT"),
            leg("Oshodi BRT Terminal", OSHODI, "Ikeja Underbridge", IKEJA, "200", "danfo", "Board 'Ikeja Underbridge' Danfo (last stop)"),
        ],
    }
}

/// A generic drive from `origin` to `destination`: two legs via the midpoint.
pub fn driving_sample(origin: &Location, destination: &Location) -> Route {
    let midpoint = Location::new(
        (origin.lat + destination.lat) / 2.0,
        (origin.lng + destination.lng) / 2.0,
    );
    let corner = Location::new(midpoint.lat, origin.lng);

    let step = |instruction: &str, distance: &str, duration: &str, at: Location, maneuver| RouteStep {
        instruction: instruction.to_string(),
        distance: distance.to_string(),
        duration: duration.to_string(),
        coordinates: at,
        maneuver,
        notes: None,
        fare: None,
    };

    Route::new(
        TravelMode::Driving,
        vec![
            step("Head north on your current street", "0.2 km", "1 min", origin.clone(), Maneuver::Straight),
            step("Turn right at the next junction", "0.8 km", "3 mins", corner, Maneuver::TurnRight),
            step("Continue straight", "1.5 km", "5 mins", midpoint, Maneuver::Straight),
            step("Turn left toward your destination", "1.0 km", "4 mins", destination.clone(), Maneuver::TurnLeft),
            step("Arrive at destination", "0 km", "0 mins", destination.clone(), Maneuver::Arrive),
        ],
    )
}
