//! Step navigation: the session state machine and the navigator that feeds it routes.

use serde::{Deserialize, Serialize};

use crate::adapter::{ResolvedRoute, TransitAlternative, normalize_transit, resolve_payload};
use crate::error::NavError;
use crate::fallback;
use crate::location::{LocationReading, LocationTracker, LocationUpdate};
use crate::options::NavigatorOptions;
use crate::places::{self, PlaceSearch, PlaceService};
use crate::route::Route;
use crate::types::{Location, RouteOrigin, RouteStep, TravelMode};
use crate::upstream::{RoutePayload, TransitQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NavState {
    Idle,
    RouteReady,
    Navigating,
}

/// The route being followed and how far along it the user is.
///
/// Illegal transitions are ignored and reported as `false`, never as errors: the
/// session is driven by UI events that may arrive twice or late.
#[derive(Debug, Clone, Default)]
pub struct NavigationSession {
    route: Route,
    current_step_index: usize,
    is_navigating: bool,
}

impl NavigationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn current_step_index(&self) -> usize {
        self.current_step_index
    }

    pub fn is_navigating(&self) -> bool {
        self.is_navigating
    }

    pub fn state(&self) -> NavState {
        if self.is_navigating {
            NavState::Navigating
        } else if self.route.is_empty() {
            NavState::Idle
        } else {
            NavState::RouteReady
        }
    }

    /// Replace the route. Navigation stops and progress resets.
    pub fn load(&mut self, route: Route) {
        self.route = route;
        self.current_step_index = 0;
        self.is_navigating = false;
    }

    pub fn clear(&mut self) {
        self.load(Route::default());
    }

    pub fn start(&mut self) -> bool {
        if self.state() != NavState::RouteReady {
            log::debug!("start ignored in state {:?}", self.state());
            return false;
        }
        self.is_navigating = true;
        true
    }

    /// Move to the next step, saturating at the last one.
    pub fn advance(&mut self) -> bool {
        if !self.is_navigating {
            log::debug!("advance ignored while not navigating");
            return false;
        }
        let last = self.route.step_count().saturating_sub(1);
        let next = (self.current_step_index + 1).min(last);
        let changed = next != self.current_step_index;
        self.current_step_index = next;
        changed
    }

    /// Move to the previous step, saturating at the first one.
    pub fn retreat(&mut self) -> bool {
        if !self.is_navigating {
            log::debug!("retreat ignored while not navigating");
            return false;
        }
        let changed = self.current_step_index > 0;
        self.current_step_index = self.current_step_index.saturating_sub(1);
        changed
    }

    pub fn stop(&mut self) -> bool {
        if !self.is_navigating {
            return false;
        }
        self.is_navigating = false;
        self.current_step_index = 0;
        true
    }

    pub fn current_step(&self) -> Option<&RouteStep> {
        self.route.step(self.current_step_index)
    }

    pub fn can_advance(&self) -> bool {
        self.is_navigating && self.current_step_index + 1 < self.route.step_count()
    }

    /// Where the map should look while navigating: the upcoming waypoint, or the final
    /// destination once there is no next step.
    pub fn map_focus(&self) -> Option<&Location> {
        if !self.is_navigating {
            return None;
        }
        self.route
            .step(self.current_step_index + 1)
            .or_else(|| self.route.steps().last())
            .map(|s| &s.coordinates)
    }

    /// `Some(index)` while navigating, for step status rendering.
    pub fn progress(&self) -> Option<usize> {
        self.is_navigating.then_some(self.current_step_index)
    }
}

/// Identifies one route request. Only the most recent ticket's result is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteTicket {
    pub generation: u32,
    pub mode: TravelMode,
}

/// Everything the host needs to perform a route request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    pub ticket: RouteTicket,
    pub origin: Location,
    pub destination: Location,
}

impl RouteRequest {
    pub fn transit_query(&self) -> TransitQuery {
        TransitQuery::new(&self.origin, &self.destination)
    }
}

/// What happened to a completed route request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteUpdate {
    /// False when the response belonged to a superseded request and was dropped.
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<RouteOrigin>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "error_text")]
    pub error: Option<NavError>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "error_texts")]
    pub warnings: Vec<NavError>,
}

fn error_text<S: serde::Serializer>(e: &Option<NavError>, ser: S) -> Result<S::Ok, S::Error> {
    match e {
        Some(e) => ser.serialize_str(&e.to_string()),
        None => ser.serialize_none(),
    }
}

fn error_texts<S: serde::Serializer>(es: &[NavError], ser: S) -> Result<S::Ok, S::Error> {
    ser.collect_seq(es.iter().map(|e| e.to_string()))
}

impl RouteUpdate {
    fn discarded() -> Self {
        Self {
            applied: false,
            origin: None,
            error: None,
            warnings: Vec::new(),
        }
    }
}

/// Result of a location reading, plus a route request if one became possible.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationOutcome {
    pub update: LocationUpdate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<RouteRequest>,
}

/// Owns the navigation session and everything that decides which route it holds.
#[derive(Debug)]
pub struct Navigator {
    options: NavigatorOptions,
    session: NavigationSession,
    tracker: LocationTracker,
    destination: Option<Location>,
    mode: TravelMode,
    generation: u32,
    pending: Option<RouteTicket>,
    /// A destination or mode change still owes a route request.
    needs_route: bool,
    alternatives: Vec<TransitAlternative>,
    selected_alternative: usize,
    route_origin: Option<RouteOrigin>,
}

impl Navigator {
    pub fn new(options: NavigatorOptions) -> Self {
        let tracker = LocationTracker::new(
            options.fallback_location.clone(),
            options.move_tolerance_degrees,
        );
        Self {
            mode: options.travel_mode,
            options,
            session: NavigationSession::new(),
            tracker,
            destination: None,
            generation: 0,
            pending: None,
            needs_route: false,
            alternatives: Vec::new(),
            selected_alternative: 0,
            route_origin: None,
        }
    }

    pub fn options(&self) -> &NavigatorOptions {
        &self.options
    }

    pub fn session(&self) -> &NavigationSession {
        &self.session
    }

    pub fn state(&self) -> NavState {
        self.session.state()
    }

    pub fn current_location(&self) -> Option<&Location> {
        self.tracker.current()
    }

    pub fn tracker(&self) -> &LocationTracker {
        &self.tracker
    }

    pub fn destination(&self) -> Option<&Location> {
        self.destination.as_ref()
    }

    pub fn travel_mode(&self) -> TravelMode {
        self.mode
    }

    pub fn pending(&self) -> Option<RouteTicket> {
        self.pending
    }

    pub fn alternatives(&self) -> &[TransitAlternative] {
        &self.alternatives
    }

    pub fn selected_alternative(&self) -> usize {
        self.selected_alternative
    }

    pub fn route_origin(&self) -> Option<RouteOrigin> {
        self.route_origin
    }

    /// Feed one location reading. When a destination was chosen before the location was
    /// known, this also issues its route request.
    pub fn on_location(&mut self, reading: LocationReading) -> LocationOutcome {
        let update = self.tracker.apply(reading);
        let request = if self.needs_route && self.pending.is_none() {
            self.issue_request()
        } else {
            None
        };
        LocationOutcome { update, request }
    }

    /// Choose a destination. Any current route is invalidated (stopping navigation) and,
    /// if the current location is known, a route request is returned for the host to run.
    pub fn select_destination(&mut self, destination: Location) -> Option<RouteRequest> {
        if self.session.is_navigating() {
            log::info!("destination changed while navigating; stopping");
        }
        self.invalidate();
        self.destination = Some(destination);
        self.needs_route = true;
        self.issue_request()
    }

    /// Switch between driving and transit. A selected destination is re-routed.
    pub fn set_travel_mode(&mut self, mode: TravelMode) -> Option<RouteRequest> {
        if mode == self.mode {
            return None;
        }
        self.mode = mode;
        self.invalidate();
        self.needs_route = self.destination.is_some();
        self.issue_request()
    }

    /// Search for a destination, capped at the configured number of candidates.
    pub async fn search_places<S: PlaceService>(&self, service: &S, query: &str) -> PlaceSearch {
        places::search_places(service, query, self.options.max_place_results).await
    }

    /// Forget the in-flight request; its response will be discarded when it arrives.
    /// No new request is issued until the destination or mode changes.
    pub fn cancel_pending(&mut self) {
        self.needs_route = false;
        if let Some(ticket) = self.pending.take() {
            log::debug!("route request {} cancelled", ticket.generation);
        }
    }

    /// Apply the outcome of a route request.
    ///
    /// Results for anything but the pending ticket are dropped. A failed or empty result
    /// loads the built-in sample route for the ticket's mode.
    pub fn complete_route(
        &mut self,
        ticket: RouteTicket,
        result: Result<RoutePayload, NavError>,
    ) -> RouteUpdate {
        if self.pending != Some(ticket) {
            log::info!(
                "discarding stale route response {} (pending {:?})",
                ticket.generation,
                self.pending.map(|t| t.generation)
            );
            return RouteUpdate::discarded();
        }
        self.pending = None;

        let resolved = result.and_then(|payload| resolve_payload(payload, 0));
        match resolved {
            Ok(ResolvedRoute {
                route,
                alternatives,
                warnings,
            }) if !route.is_empty() => {
                log::info!("route loaded with {} steps", route.step_count());
                self.alternatives = alternatives;
                self.selected_alternative = 0;
                self.session.load(route);
                self.route_origin = Some(RouteOrigin::Live);
                RouteUpdate {
                    applied: true,
                    origin: Some(RouteOrigin::Live),
                    error: None,
                    warnings,
                }
            }
            Ok(_) => self.load_fallback(ticket.mode, NavError::RouteEmpty),
            Err(e) => self.load_fallback(ticket.mode, e),
        }
    }

    /// Follow a different transit alternative. Navigation stops and restarts from step 0.
    pub fn select_alternative(&mut self, index: usize) -> bool {
        let Some(alternative) = self.alternatives.get(index) else {
            log::debug!("no transit alternative {index}");
            return false;
        };
        let steps = normalize_transit(&alternative.legs).steps;
        self.selected_alternative = index;
        self.session.load(Route::new(TravelMode::Transit, steps));
        true
    }

    pub fn start(&mut self) -> bool {
        self.session.start()
    }

    pub fn advance(&mut self) -> bool {
        self.session.advance()
    }

    pub fn retreat(&mut self) -> bool {
        self.session.retreat()
    }

    pub fn stop(&mut self) -> bool {
        self.session.stop()
    }

    pub fn map_focus(&self) -> Option<&Location> {
        self.session.map_focus()
    }

    /// Center for a map view: the focus target while navigating, else the user.
    pub fn view_center(&self) -> &Location {
        self.session
            .map_focus()
            .or(self.tracker.current())
            .unwrap_or(&self.options.fallback_location)
    }

    fn invalidate(&mut self) {
        self.session.clear();
        self.alternatives.clear();
        self.selected_alternative = 0;
        self.route_origin = None;
        self.pending = None;
    }

    fn issue_request(&mut self) -> Option<RouteRequest> {
        let destination = self.destination.clone()?;
        let origin = self.tracker.current()?.clone();
        self.generation = self.generation.wrapping_add(1);
        let ticket = RouteTicket {
            generation: self.generation,
            mode: self.mode,
        };
        self.pending = Some(ticket);
        self.needs_route = false;
        log::debug!("route request {} issued ({:?})", ticket.generation, ticket.mode);
        Some(RouteRequest {
            ticket,
            origin,
            destination,
        })
    }

    fn load_fallback(&mut self, mode: TravelMode, cause: NavError) -> RouteUpdate {
        log::warn!("{cause}; using the built-in {mode:?} route");
        let route = match mode {
            TravelMode::Transit => {
                let alternatives = crate::adapter::resolve_alternatives(fallback::transit_sample());
                let steps = alternatives
                    .first()
                    .map(|alt| normalize_transit(&alt.legs).steps)
                    .unwrap_or_default();
                self.alternatives = alternatives;
                Route::new(TravelMode::Transit, steps)
            }
            TravelMode::Driving => {
                self.alternatives.clear();
                let origin = self
                    .tracker
                    .current()
                    .cloned()
                    .unwrap_or_else(|| self.options.fallback_location.clone());
                let destination = self.destination.clone().unwrap_or_else(|| origin.clone());
                fallback::driving_sample(&origin, &destination)
            }
        };
        self.selected_alternative = 0;
        self.session.load(route);
        self.route_origin = Some(RouteOrigin::Fallback);
        RouteUpdate {
            applied: true,
            origin: Some(RouteOrigin::Fallback),
            error: Some(cause),
            warnings: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Maneuver;

    fn route_of(len: usize) -> Route {
        let steps = (0..len)
            .map(|i| RouteStep {
                instruction: format!("step {i}"),
                distance: "1 km".to_string(),
                duration: "1 min".to_string(),
                coordinates: Location::new(i as f64, i as f64),
                maneuver: if i + 1 == len {
                    Maneuver::Arrive
                } else {
                    Maneuver::Straight
                },
                notes: None,
                fare: None,
            })
            .collect();
        Route::new(TravelMode::Driving, steps)
    }

    #[test]
    fn test_lifecycle() {
        let mut session = NavigationSession::new();
        assert_eq!(session.state(), NavState::Idle);
        session.load(route_of(3));
        assert_eq!(session.state(), NavState::RouteReady);
        assert!(session.start());
        assert_eq!(session.state(), NavState::Navigating);
        assert!(!session.start());
        assert!(session.advance());
        assert!(session.stop());
        assert_eq!(session.state(), NavState::RouteReady);
        assert_eq!(session.current_step_index(), 0);
    }

    #[test]
    fn test_start_rejected_on_empty_route() {
        let mut session = NavigationSession::new();
        assert!(!session.start());
        assert_eq!(session.state(), NavState::Idle);
        session.load(route_of(0));
        assert!(!session.start());
        assert!(!session.is_navigating());
    }

    #[test]
    fn test_advance_saturates() {
        let mut session = NavigationSession::new();
        session.load(route_of(4));
        session.start();
        for _ in 0..10 {
            session.advance();
            assert!(session.current_step_index() <= 3);
        }
        assert_eq!(session.current_step_index(), 3);
        assert!(!session.advance());
        assert!(!session.can_advance());
    }

    #[test]
    fn test_retreat_saturates() {
        let mut session = NavigationSession::new();
        session.load(route_of(3));
        session.start();
        assert!(!session.retreat());
        session.advance();
        assert!(session.retreat());
        assert_eq!(session.current_step_index(), 0);
    }

    #[test]
    fn test_moves_ignored_when_not_navigating() {
        let mut session = NavigationSession::new();
        session.load(route_of(3));
        assert!(!session.advance());
        assert!(!session.retreat());
        assert!(!session.stop());
        assert_eq!(session.current_step_index(), 0);
    }

    #[test]
    fn test_map_focus_looks_ahead() {
        let mut session = NavigationSession::new();
        session.load(route_of(3));
        assert!(session.map_focus().is_none());
        session.start();
        for i in 0..3 {
            let expected = if i + 1 < 3 { i + 1 } else { 2 };
            let focus = session.map_focus().unwrap();
            assert_eq!(focus.lat, expected as f64);
            session.advance();
        }
    }

    #[test]
    fn test_single_step_focus_is_destination() {
        let mut session = NavigationSession::new();
        session.load(route_of(1));
        session.start();
        assert_eq!(session.map_focus().unwrap().lat, 0.0);
    }

    #[test]
    fn test_load_resets_progress() {
        let mut session = NavigationSession::new();
        session.load(route_of(3));
        session.start();
        session.advance();
        session.load(route_of(2));
        assert_eq!(session.current_step_index(), 0);
        assert!(!session.is_navigating());
    }
}
