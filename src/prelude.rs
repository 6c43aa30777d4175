//! Prelude module for common geothrottle types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use geothrottle::prelude::*;`

pub use crate::core::{
    config::{LocationConfig, ResolutionProfile, ScreenOptions, ServiceConfig, ThrottleConfig},
    geo::{LatLng, LatLngBounds, Region},
    viewport::{MapViewport, Viewport},
};

pub use crate::events::{EventManager, MapEvent};

pub use crate::geocode::{
    Address, AddressOutcome, AddressResolutionThrottle, AddressSink, GeocodeCompletion,
    GeocodeError, GeocodingService, MoveDecision, NominatimGeocoder, Placemark, ThrottleState,
};

pub use crate::location::{
    AlertKind, AuthorizationStatus, LocationAction, LocationProvider, LocationTracker,
};

pub use crate::request::{completion_channel, Completion, InFlight, RequestHandle};

pub use crate::routing::{
    DirectionsTracker, OsrmRouter, Route, RouteCompletion, RouteOutcome, RouteSink,
    RoutingError, RoutingService, TransportType,
};

pub use crate::runtime::{runtime, spawn, AsyncHandle, AsyncSpawner};

pub use crate::screen::MapScreen;

pub use crate::{Error, Result};

pub use std::{
    collections::VecDeque,
    pin::Pin,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

pub use fxhash::FxHashMap as HashMap;

pub use futures::Future;
