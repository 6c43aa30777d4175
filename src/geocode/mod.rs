//! Reverse geocoding: the service port, the address model and the
//! distance-based throttle that decides when a lookup is worth issuing.

pub mod nominatim;
pub mod throttle;

pub use nominatim::NominatimGeocoder;
pub use throttle::{AddressResolutionThrottle, MoveDecision, ThrottleState};

use crate::core::geo::LatLng;
use crate::request::{Completion, RequestHandle};
use serde::{Deserialize, Serialize};

/// Errors reported by a geocoding lookup
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeocodeError {
    #[error("Request failed: {0}")]
    Network(String),

    #[error("Geocoding service error (HTTP {status}): {message}")]
    Service { status: u16, message: String },

    #[error("Failed to parse geocoding response: {0}")]
    Parse(String),

    #[error("No async runtime available to run the lookup")]
    RuntimeUnavailable,
}

impl From<reqwest::Error> for GeocodeError {
    fn from(err: reqwest::Error) -> Self {
        GeocodeError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for GeocodeError {
    fn from(err: serde_json::Error) -> Self {
        GeocodeError::Parse(err.to_string())
    }
}

/// One candidate returned by a reverse lookup
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Placemark {
    pub house_number: Option<String>,
    pub road: Option<String>,
    pub locality: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
    pub display_name: Option<String>,
}

impl Placemark {
    /// Placemark with just a street number and street name
    pub fn street(house_number: &str, road: &str) -> Self {
        Self {
            house_number: Some(house_number.to_string()),
            road: Some(road.to_string()),
            ..Default::default()
        }
    }
}

/// The resolved, displayable address for a coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// Single display line, e.g. "123 Main St"
    pub line: String,
    pub placemark: Placemark,
}

impl Address {
    /// Builds the display line from a placemark, `None` if it carries nothing usable
    pub fn from_placemark(placemark: &Placemark) -> Option<Self> {
        let street: Vec<&str> = [&placemark.house_number, &placemark.road]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();

        let line = if street.is_empty() {
            placemark
                .display_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())?
                .to_string()
        } else {
            street.join(" ")
        };

        Some(Self {
            line,
            placemark: placemark.clone(),
        })
    }

    /// The primary candidate of a lookup result is its first placemark
    pub fn primary(placemarks: &[Placemark]) -> Option<Self> {
        placemarks.first().and_then(Self::from_placemark)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.line)
    }
}

/// What the UI gets told after a lookup finishes
#[derive(Debug, Clone, PartialEq)]
pub enum AddressOutcome {
    Resolved(Address),
    NoAddressFound,
    ResolutionFailed(GeocodeError),
}

/// Receives every published outcome, exactly once per honored lookup
pub trait AddressSink {
    fn on_address_resolved(&mut self, outcome: AddressOutcome);
}

impl<F> AddressSink for F
where
    F: FnMut(AddressOutcome),
{
    fn on_address_resolved(&mut self, outcome: AddressOutcome) {
        self(outcome)
    }
}

/// Completion delivered by a geocoding service
pub type GeocodeCompletion = Completion<Vec<Placemark>, GeocodeError>;

/// Cancellable asynchronous reverse geocoder
///
/// Results are delivered out of band as [`GeocodeCompletion`]s tagged with the
/// handle returned from `lookup`. Cancellation is best-effort: a result for a
/// cancelled handle may still arrive.
pub trait GeocodingService {
    fn lookup(&mut self, coordinate: LatLng) -> RequestHandle;

    fn cancel(&mut self, handle: RequestHandle);
}
