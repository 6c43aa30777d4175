//! The location-side port and the authorization flow run when the screen
//! becomes active or the user changes permissions.

use crate::core::config::LocationConfig;
use crate::core::geo::{LatLng, Region};
use serde::{Deserialize, Serialize};

/// Permission state for location services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorizationStatus {
    NotDetermined,
    Restricted,
    Denied,
    AuthorizedWhenInUse,
    AuthorizedAlways,
}

impl AuthorizationStatus {
    pub fn is_authorized(&self) -> bool {
        matches!(
            self,
            AuthorizationStatus::AuthorizedWhenInUse | AuthorizationStatus::AuthorizedAlways
        )
    }
}

/// Reasons the user has to be told that location is unavailable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertKind {
    /// Location services are switched off device-wide
    ServicesDisabled,
    PermissionDenied,
    /// Parental controls or device policy
    Restricted,
}

/// What the screen should do after an authorization check
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationAction {
    /// Updates were started; follow the user and show `region` if a fix is known
    StartTracking { region: Option<Region> },
    /// Authorization was requested; wait for the change notification
    RequestAuthorization,
    ShowAlert(AlertKind),
}

/// Source of the device position and authorization state
pub trait LocationProvider {
    fn services_enabled(&self) -> bool;

    fn authorization_status(&self) -> AuthorizationStatus;

    /// Most recently retrieved position, if any
    fn current_position(&self) -> Option<LatLng>;

    fn request_when_in_use_authorization(&mut self);

    fn start_updating(&mut self);

    fn stop_updating(&mut self);
}

/// Runs the authorization flow and turns position fixes into map regions
#[derive(Debug, Clone, Default)]
pub struct LocationTracker {
    config: LocationConfig,
    tracking: bool,
}

impl LocationTracker {
    pub fn new(config: LocationConfig) -> Self {
        Self {
            config,
            tracking: false,
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// Check services and permissions, starting updates when allowed
    pub fn check_authorization<P: LocationProvider + ?Sized>(
        &mut self,
        provider: &mut P,
    ) -> LocationAction {
        if !provider.services_enabled() {
            log::warn!("location services are disabled");
            self.stop(provider);
            return LocationAction::ShowAlert(AlertKind::ServicesDisabled);
        }

        let status = provider.authorization_status();
        log::debug!("location authorization: {:?}", status);
        match status {
            AuthorizationStatus::AuthorizedWhenInUse | AuthorizationStatus::AuthorizedAlways => {
                if !self.tracking {
                    provider.start_updating();
                    self.tracking = true;
                }
                let region = provider
                    .current_position()
                    .map(|position| self.region_around(position));
                LocationAction::StartTracking { region }
            }
            AuthorizationStatus::NotDetermined => {
                provider.request_when_in_use_authorization();
                LocationAction::RequestAuthorization
            }
            AuthorizationStatus::Denied => {
                self.stop(provider);
                LocationAction::ShowAlert(AlertKind::PermissionDenied)
            }
            AuthorizationStatus::Restricted => {
                self.stop(provider);
                LocationAction::ShowAlert(AlertKind::Restricted)
            }
        }
    }

    /// Region to show for a batch of fixes; the newest (last) fix wins
    pub fn region_for_update(&self, locations: &[LatLng]) -> Option<Region> {
        locations.last().map(|location| self.region_around(*location))
    }

    pub fn region_around(&self, center: LatLng) -> Region {
        Region::around(center, self.config.region_meters)
    }

    pub fn stop<P: LocationProvider + ?Sized>(&mut self, provider: &mut P) {
        if self.tracking {
            provider.stop_updating();
            self.tracking = false;
        }
    }
}

/// In-memory provider with a settable fix, used by tests and the demo binary
#[derive(Debug, Clone)]
pub struct StaticLocationProvider {
    pub enabled: bool,
    pub status: AuthorizationStatus,
    pub position: Option<LatLng>,
    /// Status granted when authorization is requested
    pub grant_on_request: AuthorizationStatus,
    pub updating: bool,
    pub authorization_requests: usize,
}

impl StaticLocationProvider {
    pub fn authorized(position: LatLng) -> Self {
        Self {
            enabled: true,
            status: AuthorizationStatus::AuthorizedWhenInUse,
            position: Some(position),
            grant_on_request: AuthorizationStatus::AuthorizedWhenInUse,
            updating: false,
            authorization_requests: 0,
        }
    }

    pub fn undetermined(grant_on_request: AuthorizationStatus) -> Self {
        Self {
            enabled: true,
            status: AuthorizationStatus::NotDetermined,
            position: None,
            grant_on_request,
            updating: false,
            authorization_requests: 0,
        }
    }

    pub fn set_position(&mut self, position: LatLng) {
        self.position = Some(position);
    }
}

impl LocationProvider for StaticLocationProvider {
    fn services_enabled(&self) -> bool {
        self.enabled
    }

    fn authorization_status(&self) -> AuthorizationStatus {
        self.status
    }

    fn current_position(&self) -> Option<LatLng> {
        self.position
    }

    fn request_when_in_use_authorization(&mut self) {
        self.authorization_requests += 1;
        self.status = self.grant_on_request;
    }

    fn start_updating(&mut self) {
        self.updating = true;
    }

    fn stop_updating(&mut self) {
        self.updating = false;
    }
}
