//! Engine-wide defaults for the location and address-resolution pipeline.
//! Keeping them in a single place makes it easier to tweak the magic numbers.

/// Mean equatorial earth radius in metres (WGS84), used for haversine distances.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Metres per degree of latitude, used to turn region sizes into spans.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Minimum displacement of the map center before a new address lookup is issued.
pub const DEFAULT_THRESHOLD_METERS: f64 = 50.0;

/// Side length of the region shown around the user's location.
pub const DEFAULT_REGION_METERS: f64 = 100.0;

/// Public Nominatim instance used by the default geocoder.
pub const NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Public OSRM demo server used by the default router.
pub const OSRM_BASE_URL: &str = "https://router.project-osrm.org";

/// User-Agent sent with every lookup; public services reject anonymous clients.
pub const USER_AGENT: &str = "geothrottle/0.1.0";

/// Per-request timeout for geocoding and routing lookups.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
