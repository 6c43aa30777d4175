//! Directions from a starting point to the map center. The routing backend is
//! an external service; this module owns only the call/cancel contract and the
//! rule that a new request always supersedes the previous one.

pub mod osrm;

pub use osrm::OsrmRouter;

use crate::core::geo::LatLng;
use crate::request::{Completion, InFlight, RequestHandle};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RoutingError {
    #[error("Request failed: {0}")]
    Network(String),

    #[error("Routing service error (HTTP {status}): {message}")]
    Service { status: u16, message: String },

    #[error("Failed to parse routing response: {0}")]
    Parse(String),

    #[error("No async runtime available to run the request")]
    RuntimeUnavailable,
}

impl From<reqwest::Error> for RoutingError {
    fn from(err: reqwest::Error) -> Self {
        RoutingError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for RoutingError {
    fn from(err: serde_json::Error) -> Self {
        RoutingError::Parse(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TransportType {
    Walking,
    #[default]
    Driving,
}

/// A route returned by the directions service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Polyline from origin to destination
    pub coordinates: Vec<LatLng>,
    pub distance_meters: f64,
    pub expected_travel_time: Duration,
    pub transport: TransportType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Found(Route),
    NoRoute,
    Failed(RoutingError),
}

pub trait RouteSink {
    fn on_route_resolved(&mut self, outcome: RouteOutcome);
}

impl<F> RouteSink for F
where
    F: FnMut(RouteOutcome),
{
    fn on_route_resolved(&mut self, outcome: RouteOutcome) {
        self(outcome)
    }
}

pub type RouteCompletion = Completion<Vec<Route>, RoutingError>;

/// Cancellable asynchronous directions lookup
pub trait RoutingService {
    fn request(
        &mut self,
        origin: LatLng,
        destination: LatLng,
        transport: TransportType,
    ) -> RequestHandle;

    fn cancel(&mut self, handle: RequestHandle);
}

/// Keeps at most one directions request alive and publishes only its result
pub struct DirectionsTracker<R> {
    service: R,
    sink: Box<dyn RouteSink>,
    pending: InFlight,
}

impl<R: RoutingService> DirectionsTracker<R> {
    pub fn new(service: R, sink: Box<dyn RouteSink>) -> Self {
        Self {
            service,
            sink,
            pending: InFlight::new(),
        }
    }

    /// Start a new request, cancelling the outstanding one first
    pub fn request(
        &mut self,
        origin: LatLng,
        destination: LatLng,
        transport: TransportType,
    ) -> RequestHandle {
        self.reset();
        let handle = self.service.request(origin, destination, transport);
        self.pending.replace(handle);
        log::debug!(
            "requesting {:?} directions {} -> {} as {}",
            transport,
            origin,
            destination,
            handle
        );
        handle
    }

    /// Feed a completion back in. Returns true if an outcome was published.
    pub fn on_route_result(
        &mut self,
        handle: RequestHandle,
        result: Result<Vec<Route>, RoutingError>,
    ) -> bool {
        if !self.pending.take(handle) {
            log::trace!("discarding stale route result {}", handle);
            return false;
        }

        let outcome = match result {
            Ok(routes) => match routes.into_iter().next() {
                Some(route) => {
                    log::info!(
                        "route found: {:.0} m, {:?}",
                        route.distance_meters,
                        route.expected_travel_time
                    );
                    RouteOutcome::Found(route)
                }
                None => RouteOutcome::NoRoute,
            },
            Err(err) => {
                log::warn!("directions request failed: {}", err);
                RouteOutcome::Failed(err)
            }
        };

        self.sink.on_route_resolved(outcome);
        true
    }

    /// Cancel the outstanding request, if any
    pub fn reset(&mut self) {
        if let Some(old) = self.pending.clear() {
            log::debug!("cancelling directions request {}", old);
            self.service.cancel(old);
        }
    }

    pub fn is_routing(&self) -> bool {
        self.pending.is_pending()
    }

    pub fn pending_handle(&self) -> Option<RequestHandle> {
        self.pending.current()
    }

    pub fn service(&self) -> &R {
        &self.service
    }
}
