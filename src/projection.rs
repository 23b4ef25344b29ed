//! Projection of geographic points onto a self-drawn map surface.
//!
//! This is a local equirectangular approximation: latitude and longitude degrees are
//! scaled linearly around the view center. It is only meaningful for city-scale ranges
//! (a few hundredths of a degree). No ellipsoidal or latitude-dependent correction is
//! applied, so east-west distances are exaggerated away from the equator.

use serde::Serialize;

use crate::navigation::NavigationSession;
use crate::route::Route;
use crate::types::Location;

const MIN_RANGE_DEGREES: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

/// Project `location` onto a `width` x `height` surface centered on `center`, where
/// `range` degrees span half the surface in each direction.
///
/// `y = height/2 - ((lat - centerLat)/range) * (height/2)`
/// `x = width/2 + ((lng - centerLng)/range) * (width/2)`
pub fn project(location: &Location, center: &Location, width: f64, height: f64, range: f64) -> ScreenPoint {
    let range = range.max(MIN_RANGE_DEGREES);
    let half_w = width / 2.0;
    let half_h = height / 2.0;
    ScreenPoint {
        x: half_w + ((location.lng - center.lng) / range) * half_w,
        y: half_h - ((location.lat - center.lat) / range) * half_h,
    }
}

/// A viewport over the map. Holds no derived state; every projection is recomputed
/// from the current center, size and range.
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub center: Location,
    pub width: f64,
    pub height: f64,
    pub range: f64,
}

impl MapView {
    pub fn new(center: Location, width: f64, height: f64, range: f64) -> Self {
        Self {
            center,
            width,
            height,
            range: range.max(MIN_RANGE_DEGREES),
        }
    }

    pub fn project(&self, location: &Location) -> ScreenPoint {
        project(location, &self.center, self.width, self.height, self.range)
    }

    pub fn contains(&self, point: ScreenPoint) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }

    /// Zoom in by `factor` (> 1) or out (< 1). Non-positive factors are ignored.
    pub fn zoom_by(&mut self, factor: f64) {
        if factor > 0.0 && factor.is_finite() {
            self.range = (self.range / factor).max(MIN_RANGE_DEGREES);
        }
    }

    pub fn recenter(&mut self, center: Location) {
        self.center = center;
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn project_route(&self, route: &Route) -> Vec<ScreenPoint> {
        route
            .steps()
            .iter()
            .map(|s| self.project(&s.coordinates))
            .collect()
    }

    /// Screen positions of everything a canvas renderer draws for this session.
    pub fn scene(
        &self,
        session: &NavigationSession,
        user: Option<&Location>,
        destination: Option<&Location>,
    ) -> Scene {
        Scene {
            route: self.project_route(session.route()),
            current_step: session
                .progress()
                .and_then(|i| session.route().step(i))
                .map(|s| self.project(&s.coordinates)),
            user: user.map(|l| self.project(l)),
            destination: destination.map(|l| self.project(l)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub route: Vec<ScreenPoint>,
    /// Highlighted only while navigating.
    pub current_step: Option<ScreenPoint>,
    pub user: Option<ScreenPoint>,
    pub destination: Option<ScreenPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Maneuver, RouteStep, TravelMode};

    fn close(a: ScreenPoint, x: f64, y: f64) -> bool {
        (a.x - x).abs() < 1e-9 && (a.y - y).abs() < 1e-9
    }

    #[test]
    fn test_center_maps_to_middle() {
        let c = Location::new(6.5, 3.3);
        assert!(close(project(&c, &c, 800.0, 600.0, 0.01), 400.0, 300.0));
    }

    #[test]
    fn test_north_is_up_east_is_right() {
        let c = Location::new(6.5, 3.3);
        let ne = Location::new(6.51, 3.31);
        let p = project(&ne, &c, 800.0, 600.0, 0.01);
        assert!(close(p, 800.0, 0.0));

        let sw = Location::new(6.495, 3.295);
        let p = project(&sw, &c, 800.0, 600.0, 0.01);
        assert!(close(p, 200.0, 450.0));
    }

    #[test]
    fn test_zero_range_does_not_divide_by_zero() {
        let c = Location::new(6.5, 3.3);
        let p = project(&Location::new(6.6, 3.3), &c, 100.0, 100.0, 0.0);
        assert!(p.y.is_finite());
    }

    #[test]
    fn test_zoom_and_contains() {
        let c = Location::new(6.5, 3.3);
        let mut view = MapView::new(c.clone(), 100.0, 100.0, 0.01);
        let edge = Location::new(6.508, 3.3);
        assert!(view.contains(view.project(&edge)));
        view.zoom_by(2.0);
        assert_eq!(view.range, 0.005);
        assert!(!view.contains(view.project(&edge)));
        view.zoom_by(0.0);
        view.zoom_by(-1.0);
        assert_eq!(view.range, 0.005);
    }

    #[test]
    fn test_scene_highlights_only_while_navigating() {
        let step = |lat: f64, maneuver| RouteStep {
            instruction: String::new(),
            distance: String::new(),
            duration: String::new(),
            coordinates: Location::new(lat, 3.3),
            maneuver,
            notes: None,
            fare: None,
        };
        let mut session = NavigationSession::new();
        session.load(Route::new(
            TravelMode::Driving,
            vec![step(6.5, Maneuver::Straight), step(6.505, Maneuver::Arrive)],
        ));
        let view = MapView::new(Location::new(6.5, 3.3), 200.0, 200.0, 0.01);

        let scene = view.scene(&session, None, None);
        assert_eq!(scene.route.len(), 2);
        assert!(scene.current_step.is_none());

        session.start();
        session.advance();
        let scene = view.scene(&session, Some(&Location::new(6.5, 3.3)), None);
        assert!(close(scene.current_step.unwrap(), 100.0, 50.0));
        assert!(close(scene.user.unwrap(), 100.0, 100.0));
    }
}
