//! Configuration system for address resolution and location behavior
//!
//! Options can be picked from presets through [`ResolutionProfile`], built by
//! hand, or loaded from JSON. Every resolved [`ScreenOptions`] can be checked
//! with [`ScreenOptions::validate`] before it is handed to a screen.

use crate::core::constants::{
    DEFAULT_REGION_METERS, DEFAULT_THRESHOLD_METERS, DEFAULT_TIMEOUT_MS, NOMINATIM_BASE_URL,
    OSRM_BASE_URL, USER_AGENT,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResolutionProfile {
    #[default]
    Balanced,
    /// Fewer lookups; suited to metered public services
    Frugal,
    /// Resolve on small movements
    Eager,
    Custom(ScreenOptions),
}

impl ResolutionProfile {
    pub fn resolve(&self) -> ScreenOptions {
        match self {
            Self::Balanced => ScreenOptions {
                throttle: ThrottleConfig {
                    threshold_meters: DEFAULT_THRESHOLD_METERS,
                },
                location: LocationConfig {
                    region_meters: DEFAULT_REGION_METERS,
                },
                geocoder: ServiceConfig::nominatim(),
                router: ServiceConfig::osrm(),
            },
            Self::Frugal => ScreenOptions {
                throttle: ThrottleConfig {
                    threshold_meters: 200.0,
                },
                location: LocationConfig {
                    region_meters: 500.0,
                },
                geocoder: ServiceConfig {
                    timeout_ms: 20_000,
                    ..ServiceConfig::nominatim()
                },
                router: ServiceConfig {
                    timeout_ms: 20_000,
                    ..ServiceConfig::osrm()
                },
            },
            Self::Eager => ScreenOptions {
                throttle: ThrottleConfig {
                    threshold_meters: 10.0,
                },
                location: LocationConfig {
                    region_meters: DEFAULT_REGION_METERS,
                },
                geocoder: ServiceConfig {
                    timeout_ms: 5_000,
                    ..ServiceConfig::nominatim()
                },
                router: ServiceConfig::osrm(),
            },
            Self::Custom(options) => options.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenOptions {
    pub throttle: ThrottleConfig,
    pub location: LocationConfig,
    pub geocoder: ServiceConfig,
    pub router: ServiceConfig,
}

impl Default for ScreenOptions {
    fn default() -> Self {
        ResolutionProfile::default().resolve()
    }
}

impl ScreenOptions {
    /// Parses options from JSON; missing sections fall back to the balanced preset.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: ScreenOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        self.throttle.validate()?;
        self.location.validate()?;
        self.geocoder.validate()?;
        self.router.validate()
    }
}

/// Displacement policy for address lookups
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Movements strictly shorter than this are ignored
    pub threshold_meters: f64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            threshold_meters: DEFAULT_THRESHOLD_METERS,
        }
    }
}

impl ThrottleConfig {
    pub fn with_threshold(threshold_meters: f64) -> Result<Self> {
        let config = Self { threshold_meters };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.threshold_meters.is_finite() || self.threshold_meters < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "threshold_meters must be a finite, non-negative number (got {})",
                self.threshold_meters
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Side length of the region shown around the user's location
    pub region_meters: f64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            region_meters: DEFAULT_REGION_METERS,
        }
    }
}

impl LocationConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.region_meters.is_finite() || self.region_meters <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "region_meters must be positive (got {})",
                self.region_meters
            )));
        }
        Ok(())
    }
}

/// Endpoint settings for an HTTP lookup service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_ms: u64,
}

impl ServiceConfig {
    pub fn nominatim() -> Self {
        Self {
            base_url: NOMINATIM_BASE_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn osrm() -> Self {
        Self {
            base_url: OSRM_BASE_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::InvalidConfig("base_url must not be empty".into()));
        }
        if self.timeout_ms == 0 {
            return Err(Error::InvalidConfig("timeout_ms must be positive".into()));
        }
        Ok(())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::nominatim()
    }
}
