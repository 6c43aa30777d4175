use crate::core::constants::{DEFAULT_REGION_METERS, EARTH_RADIUS, METERS_PER_DEGREE};
use serde::{Deserialize, Serialize};

/// Represents a geographical coordinate with latitude and longitude
///
/// No range validation happens on construction; values reported by the
/// location stack are passed through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validates that the coordinates are within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat >= -90.0 && self.lat <= 90.0 && self.lng >= -180.0 && self.lng <= 180.0
    }

    /// Calculates the distance to another LatLng in metres using the Haversine formula
    pub fn distance_to(&self, other: &LatLng) -> f64 {
        let lat1_rad = self.lat.to_radians();
        let lat2_rad = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS * c
    }

    /// Returns the coordinate displaced by the given number of metres north and east.
    ///
    /// Planar approximation, only meaningful for short offsets.
    pub fn offset_meters(&self, north: f64, east: f64) -> LatLng {
        let dlat = north / METERS_PER_DEGREE;
        let cos_lat = self.lat.to_radians().cos().abs().max(1e-12);
        let dlng = east / (METERS_PER_DEGREE * cos_lat);
        LatLng::new(self.lat + dlat, self.lng + dlng)
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// Represents a bounding box of geographical coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Creates bounds from individual coordinates
    pub fn from_coords(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self::new(LatLng::new(south, west), LatLng::new(north, east))
    }

    /// Checks if the bounds contain a point
    pub fn contains(&self, point: &LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    /// Gets the center point of the bounds
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }

    /// Gets the span of the bounds
    pub fn span(&self) -> LatLng {
        LatLng::new(
            self.north_east.lat - self.south_west.lat,
            self.north_east.lng - self.south_west.lng,
        )
    }
}

/// The rectangular area of the map shown around a center, sized in metres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub center: LatLng,
    pub latitudinal_meters: f64,
    pub longitudinal_meters: f64,
}

impl Region {
    pub fn new(center: LatLng, latitudinal_meters: f64, longitudinal_meters: f64) -> Self {
        Self {
            center,
            latitudinal_meters,
            longitudinal_meters,
        }
    }

    /// Square region of `meters` on each side centered on `center`
    pub fn around(center: LatLng, meters: f64) -> Self {
        Self::new(center, meters, meters)
    }

    /// Latitude and longitude deltas in degrees covered by the region
    pub fn span(&self) -> LatLng {
        let lat_delta = self.latitudinal_meters / METERS_PER_DEGREE;
        let cos_lat = self.center.lat.to_radians().cos().abs().max(1e-12);
        let lng_delta = self.longitudinal_meters / (METERS_PER_DEGREE * cos_lat);
        LatLng::new(lat_delta, lng_delta.min(360.0))
    }

    pub fn bounds(&self) -> LatLngBounds {
        let span = self.span();
        LatLngBounds::from_coords(
            self.center.lat - span.lat / 2.0,
            self.center.lng - span.lng / 2.0,
            self.center.lat + span.lat / 2.0,
            self.center.lng + span.lng / 2.0,
        )
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::around(LatLng::default(), DEFAULT_REGION_METERS)
    }
}
