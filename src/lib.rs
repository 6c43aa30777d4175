//! # geothrottle
//!
//! Turns the high-frequency stream of map-center changes produced by an
//! interactive map into a low-frequency, non-overlapping stream of reverse
//! geocoding requests, and publishes each resolved street address once.
//!
//! The crate is organised around ports: a [`core::viewport::MapViewport`]
//! reports center changes, a [`location::LocationProvider`] reports the user's
//! position, and [`geocode::GeocodingService`] / [`routing::RoutingService`]
//! perform the network lookups. [`screen::MapScreen`] owns all mutable state
//! and drives everything from one sequential context.

pub mod core;
pub mod events;
pub mod geocode;
pub mod location;
#[cfg(feature = "debug")]
pub mod logging;
pub mod prelude;
pub mod request;
pub mod routing;
pub mod runtime;
pub mod screen;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    config::{ResolutionProfile, ScreenOptions, ThrottleConfig},
    geo::{LatLng, LatLngBounds, Region},
    viewport::{MapViewport, Viewport},
};

pub use events::{EventManager, MapEvent};

pub use geocode::{
    Address, AddressOutcome, AddressResolutionThrottle, AddressSink, GeocodeError,
    GeocodingService, NominatimGeocoder, Placemark, ThrottleState,
};

pub use location::{AuthorizationStatus, LocationAction, LocationProvider, LocationTracker};

pub use request::{Completion, InFlight, RequestHandle};

pub use routing::{
    DirectionsTracker, OsrmRouter, Route, RouteOutcome, RouteSink, RoutingError, RoutingService,
    TransportType,
};

pub use screen::MapScreen;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Current location is not available")]
    LocationUnavailable,

    #[error("No async runtime available")]
    RuntimeUnavailable,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
