pub mod adapter;
pub mod error;
pub mod export;
pub mod fallback;
pub mod location;
pub mod logging;
pub mod markup;
pub mod navigation;
pub mod options;
pub mod places;
pub mod projection;
pub mod route;
pub mod service;
pub mod types;
pub mod upstream;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::adapter::{normalize_driving, normalize_transit, resolve_alternatives, transit_polyline};
use crate::error::{LocationErrorKind, NavError};
use crate::location::LocationSample;
use crate::navigation::{Navigator, RouteTicket};
use crate::options::NavigatorOptions;
use crate::places::fallback_suggestions;
use crate::projection::MapView;
use crate::service::payload_from_response;
use crate::types::{Location, RouteStep, TravelMode};
use crate::upstream::{DirectionsResponse, TransitResponse};

/// Install console logging at `level` (`"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`, `"off"`).
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging(level: &str) {
    console_error_panic_hook::set_once();
    logging::init(logging::parse_level(level));
}

/// Normalize a directions response body into route steps.
#[wasm_bindgen(js_name = normalizeDriving)]
pub fn normalize_driving_js(body: &str) -> Result<JsValue, JsValue> {
    let response: DirectionsResponse = serde_json::from_str(body).map_err(NavError::from)?;
    let steps = normalize_driving(&response.into_steps()?);
    to_js(&steps)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NormalizedAlternative {
    label: String,
    total_cost: u64,
    steps: Vec<RouteStep>,
}

/// Normalize a transit response body (flat or with alternatives) into one step list per alternative.
#[wasm_bindgen(js_name = normalizeTransit)]
pub fn normalize_transit_js(body: &str) -> Result<JsValue, JsValue> {
    let response: TransitResponse = serde_json::from_str(body).map_err(NavError::from)?;
    let normalized: Vec<NormalizedAlternative> = resolve_alternatives(response)
        .into_iter()
        .map(|alt| NormalizedAlternative {
            steps: normalize_transit(&alt.legs).steps,
            label: alt.label,
            total_cost: alt.total_cost,
        })
        .collect();
    to_js(&normalized)
}

/// Project a point onto a drawing surface centered on (`center_lat`, `center_lng`).
#[wasm_bindgen(js_name = projectPoint)]
pub fn project_point(
    lat: f64,
    lng: f64,
    center_lat: f64,
    center_lng: f64,
    width: f64,
    height: f64,
    range: f64,
) -> Result<JsValue, JsValue> {
    let point = projection::project(
        &Location::new(lat, lng),
        &Location::new(center_lat, center_lng),
        width,
        height,
        range,
    );
    to_js(&point)
}

/// The navigation state machine, as a JS class.
///
/// The host owns the network and the geolocation watch: it feeds readings in with
/// `pushLocation`/`pushLocationError`, performs the requests this object returns, and
/// reports each response with `completeRoute`/`failRoute`.
#[wasm_bindgen]
pub struct WasmNavigator {
    inner: Navigator,
}

#[wasm_bindgen]
impl WasmNavigator {
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<WasmNavigator, JsValue> {
        console_error_panic_hook::set_once();
        let options = parse_options(options)?;
        Ok(Self {
            inner: Navigator::new(options),
        })
    }

    /// Returns `{ update, request? }`.
    #[wasm_bindgen(js_name = pushLocation)]
    pub fn push_location(&mut self, lat: f64, lng: f64, accuracy: f64) -> Result<JsValue, JsValue> {
        let outcome = self.inner.on_location(Ok(LocationSample {
            lat,
            lng,
            accuracy_m: accuracy,
        }));
        to_js(&outcome)
    }

    /// `code` is `GeolocationPositionError.code`.
    #[wasm_bindgen(js_name = pushLocationError)]
    pub fn push_location_error(&mut self, code: u16) -> Result<JsValue, JsValue> {
        let outcome = self.inner.on_location(Err(LocationErrorKind::from_code(code)));
        to_js(&outcome)
    }

    /// Returns the route request to perform, or `null` while the location is unknown.
    #[wasm_bindgen(js_name = selectDestination)]
    pub fn select_destination(&mut self, destination: JsValue) -> Result<JsValue, JsValue> {
        let destination: Location = serde_wasm_bindgen::from_value(destination)?;
        let request = self.inner.select_destination(destination);
        to_js_or_null(request.as_ref())
    }

    #[wasm_bindgen(js_name = setTravelMode)]
    pub fn set_travel_mode(&mut self, mode: &str) -> Result<JsValue, JsValue> {
        let mode: TravelMode = serde_json::from_value(serde_json::Value::String(mode.to_string()))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let request = self.inner.set_travel_mode(mode);
        to_js_or_null(request.as_ref())
    }

    /// Report an HTTP response for `ticket`. Returns `{ applied, origin?, error?, warnings? }`.
    #[wasm_bindgen(js_name = completeRoute)]
    pub fn complete_route(&mut self, ticket: JsValue, status: u16, body: &str) -> Result<JsValue, JsValue> {
        let ticket: RouteTicket = serde_wasm_bindgen::from_value(ticket)?;
        let result = payload_from_response(ticket.mode, status, body);
        to_js(&self.inner.complete_route(ticket, result))
    }

    /// Report a request that never produced a response (network error, abort).
    #[wasm_bindgen(js_name = failRoute)]
    pub fn fail_route(&mut self, ticket: JsValue, reason: &str) -> Result<JsValue, JsValue> {
        let ticket: RouteTicket = serde_wasm_bindgen::from_value(ticket)?;
        to_js(&self.inner.complete_route(ticket, Err(NavError::request_failed(reason))))
    }

    #[wasm_bindgen(js_name = cancelPending)]
    pub fn cancel_pending(&mut self) {
        self.inner.cancel_pending();
    }

    pub fn alternatives(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.alternatives())
    }

    #[wasm_bindgen(js_name = selectAlternative)]
    pub fn select_alternative(&mut self, index: usize) -> bool {
        self.inner.select_alternative(index)
    }

    pub fn start(&mut self) -> bool {
        self.inner.start()
    }

    pub fn advance(&mut self) -> bool {
        self.inner.advance()
    }

    pub fn retreat(&mut self) -> bool {
        self.inner.retreat()
    }

    pub fn stop(&mut self) -> bool {
        self.inner.stop()
    }

    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.state())
    }

    #[wasm_bindgen(getter, js_name = currentStepIndex)]
    pub fn current_step_index(&self) -> usize {
        self.inner.session().current_step_index()
    }

    #[wasm_bindgen(getter, js_name = isNavigating)]
    pub fn is_navigating(&self) -> bool {
        self.inner.session().is_navigating()
    }

    #[wasm_bindgen(getter, js_name = canAdvance)]
    pub fn can_advance(&self) -> bool {
        self.inner.session().can_advance()
    }

    #[wasm_bindgen(js_name = currentStep)]
    pub fn current_step(&self) -> Result<JsValue, JsValue> {
        to_js_or_null(self.inner.session().current_step())
    }

    /// Steps after the current one.
    #[wasm_bindgen(js_name = remainingSteps)]
    pub fn remaining_steps(&self) -> Result<JsValue, JsValue> {
        let session = self.inner.session();
        to_js(session.route().remaining_after(session.current_step_index()))
    }

    pub fn steps(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.session().route().steps())
    }

    pub fn summary(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.session().route().summary())
    }

    #[wasm_bindgen(js_name = routeOrigin)]
    pub fn route_origin(&self) -> Result<JsValue, JsValue> {
        to_js_or_null(self.inner.route_origin().as_ref())
    }

    #[wasm_bindgen(js_name = mapFocus)]
    pub fn map_focus(&self) -> Result<JsValue, JsValue> {
        to_js_or_null(self.inner.map_focus())
    }

    #[wasm_bindgen(js_name = viewCenter)]
    pub fn view_center(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.view_center())
    }

    /// The route as a GeoJSON string, with per-step status.
    #[wasm_bindgen(js_name = routeGeoJson)]
    pub fn route_geojson(&self) -> Result<String, JsValue> {
        let session = self.inner.session();
        let fc = export::route_to_feature_collection(session.route(), session.progress());
        serde_json::to_string(&fc).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Stop-to-stop chain of the selected transit alternative.
    #[wasm_bindgen(js_name = transitPolyline)]
    pub fn transit_polyline(&self) -> Result<JsValue, JsValue> {
        to_js(&self.selected_polyline())
    }

    /// The same chain as a GeoJSON Feature string, or `undefined` with fewer than two stops.
    #[wasm_bindgen(js_name = transitPolylineGeoJson)]
    pub fn transit_polyline_geojson(&self) -> Result<Option<String>, JsValue> {
        export::polyline_feature(&self.selected_polyline())
            .map(|feature| serde_json::to_string(&feature).map_err(|e| JsValue::from_str(&e.to_string())))
            .transpose()
    }

    /// Suggestions to offer when the host's place search fails.
    #[wasm_bindgen(js_name = fallbackPlaces)]
    pub fn fallback_places(&self, query: &str) -> Result<JsValue, JsValue> {
        let mut places = fallback_suggestions(query.trim());
        places.truncate(self.inner.options().max_place_results);
        to_js(&places)
    }

    /// Screen positions for a `width` x `height` canvas, zoomed by `zoom` (1 = default range).
    pub fn scene(&self, width: f64, height: f64, zoom: f64) -> Result<JsValue, JsValue> {
        let mut view = MapView::new(
            self.inner.view_center().clone(),
            width,
            height,
            self.inner.options().map_range_degrees,
        );
        view.zoom_by(zoom);
        let scene = view.scene(
            self.inner.session(),
            self.inner.current_location(),
            self.inner.destination(),
        );
        to_js(&scene)
    }
}

impl WasmNavigator {
    fn selected_polyline(&self) -> Vec<Location> {
        self.inner
            .alternatives()
            .get(self.inner.selected_alternative())
            .map(|alt| transit_polyline(&alt.legs, self.inner.options().dedupe_transit_stops))
            .unwrap_or_default()
    }
}

fn parse_options(options: JsValue) -> Result<NavigatorOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        Ok(NavigatorOptions::default())
    } else {
        serde_wasm_bindgen::from_value(options).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn to_js_or_null<T: Serialize>(value: Option<&T>) -> Result<JsValue, JsValue> {
    match value {
        Some(v) => to_js(v),
        None => Ok(JsValue::NULL),
    }
}
