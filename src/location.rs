//! Position samples, the platform watch subscription, and fallback resolution.

use std::sync::mpsc::{self, Receiver, Sender};

use serde::Serialize;

use crate::error::LocationErrorKind;
use crate::types::Location;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationSample {
    pub lat: f64,
    pub lng: f64,
    pub accuracy_m: f64,
}

pub type LocationReading = Result<LocationSample, LocationErrorKind>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchId(pub u32);

/// Platform geolocation, e.g. `navigator.geolocation` in a browser.
pub trait LocationProvider {
    /// Deliver a single reading on `sink`.
    fn request_position(&self, sink: Sender<LocationReading>);
    /// Deliver readings on `sink` until the returned watch is cleared.
    fn watch_position(&self, sink: Sender<LocationReading>) -> WatchId;
    fn clear_watch(&self, id: WatchId);
}

/// A live subscription: one initial request plus a continuous watch, both feeding one
/// channel. The platform watch is cleared by [`LocationWatch::stop`] or on drop.
pub struct LocationWatch<'p, P: LocationProvider + ?Sized> {
    provider: &'p P,
    id: Option<WatchId>,
    readings: Receiver<LocationReading>,
}

impl<'p, P: LocationProvider + ?Sized> LocationWatch<'p, P> {
    pub fn start(provider: &'p P) -> Self {
        let (tx, rx) = mpsc::channel();
        provider.request_position(tx.clone());
        let id = provider.watch_position(tx);
        log::debug!("location watch {} started", id.0);
        Self {
            provider,
            id: Some(id),
            readings: rx,
        }
    }

    /// Readings received since the last call, oldest first.
    pub fn drain(&self) -> Vec<LocationReading> {
        self.readings.try_iter().collect()
    }

    pub fn is_active(&self) -> bool {
        self.id.is_some()
    }

    pub fn stop(&mut self) {
        if let Some(id) = self.id.take() {
            self.provider.clear_watch(id);
            log::debug!("location watch {} cleared", id.0);
        }
    }
}

impl<P: LocationProvider + ?Sized> Drop for LocationWatch<'_, P> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Result of feeding one reading to the tracker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdate {
    pub location: Location,
    /// The position differs from the previous one by more than the tolerance.
    pub moved: bool,
    pub is_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<LocationErrorKind>,
}

/// Keeps the best known position.
///
/// An error before any fix resolves to the fallback location; an error after a fix keeps
/// the last known position. Either way the error kind is reported.
#[derive(Debug, Clone)]
pub struct LocationTracker {
    current: Option<Location>,
    accuracy_m: Option<f64>,
    is_fallback: bool,
    last_error: Option<LocationErrorKind>,
    tolerance: f64,
    fallback: Location,
}

impl LocationTracker {
    pub fn new(fallback: Location, tolerance: f64) -> Self {
        Self {
            current: None,
            accuracy_m: None,
            is_fallback: false,
            last_error: None,
            tolerance,
            fallback,
        }
    }

    pub fn current(&self) -> Option<&Location> {
        self.current.as_ref()
    }

    pub fn accuracy_m(&self) -> Option<f64> {
        self.accuracy_m
    }

    pub fn is_fallback(&self) -> bool {
        self.is_fallback
    }

    pub fn last_error(&self) -> Option<LocationErrorKind> {
        self.last_error
    }

    pub fn apply(&mut self, reading: LocationReading) -> LocationUpdate {
        match reading {
            Ok(sample) => {
                let next = Location::new(sample.lat, sample.lng);
                let moved = self.is_fallback
                    || self
                        .current
                        .as_ref()
                        .is_none_or(|prev| !prev.approx_eq(&next, self.tolerance));
                if moved {
                    self.current = Some(next.clone());
                }
                self.accuracy_m = Some(sample.accuracy_m);
                self.is_fallback = false;
                self.last_error = None;
                LocationUpdate {
                    location: self.current.clone().unwrap_or(next),
                    moved,
                    is_fallback: false,
                    error: None,
                }
            }
            Err(kind) => {
                log::warn!("location error: {kind:?}");
                self.last_error = Some(kind);
                match &self.current {
                    Some(known) => LocationUpdate {
                        location: known.clone(),
                        moved: false,
                        is_fallback: self.is_fallback,
                        error: Some(kind),
                    },
                    None => {
                        self.current = Some(self.fallback.clone());
                        self.accuracy_m = None;
                        self.is_fallback = true;
                        LocationUpdate {
                            location: self.fallback.clone(),
                            moved: true,
                            is_fallback: true,
                            error: Some(kind),
                        }
                    }
                }
            }
        }
    }
}
