use crate::core::config::ScreenOptions;
use crate::core::geo::{LatLng, Region};
use crate::core::viewport::{MapViewport, Viewport};
use crate::events::MapEvent;
use crate::geocode::{AddressResolutionThrottle, AddressSink, GeocodeCompletion, GeocodingService};
use crate::location::{AuthorizationStatus, LocationAction, LocationProvider, LocationTracker};
use crate::request::RequestHandle;
use crate::routing::{DirectionsTracker, RouteCompletion, RouteSink, RoutingService, TransportType};
use crate::{Error, Result};
use crossbeam_channel::Receiver;

/// The lookup backends and the channels their completions arrive on
pub struct ScreenServices<G, R> {
    pub geocoder: G,
    pub geocode_completions: Receiver<GeocodeCompletion>,
    pub router: R,
    pub route_completions: Receiver<RouteCompletion>,
}

/// The single owner of all map-screen state.
///
/// Every notification (viewport moves, location fixes, authorization changes)
/// and every lookup completion is handled through `&mut self`, so the throttle
/// and the directions tracker are only ever mutated from one context. Hosts
/// call [`MapScreen::tick`] (or the two halves separately) from their UI loop.
pub struct MapScreen<L, G, R> {
    options: ScreenOptions,
    viewport: Viewport,
    location: L,
    tracker: LocationTracker,
    throttle: AddressResolutionThrottle<G>,
    directions: DirectionsTracker<R>,
    geocode_completions: Receiver<GeocodeCompletion>,
    route_completions: Receiver<RouteCompletion>,
    last_action: Option<LocationAction>,
}

impl<L, G, R> MapScreen<L, G, R>
where
    L: LocationProvider,
    G: GeocodingService,
    R: RoutingService,
{
    pub fn new(
        options: ScreenOptions,
        location: L,
        services: ScreenServices<G, R>,
        address_sink: Box<dyn AddressSink>,
        route_sink: Box<dyn RouteSink>,
    ) -> Result<Self> {
        options.validate()?;

        let viewport = Viewport::new(Region::around(
            LatLng::default(),
            options.location.region_meters,
        ));

        Ok(Self {
            viewport,
            location,
            tracker: LocationTracker::new(options.location),
            throttle: AddressResolutionThrottle::new(
                options.throttle,
                services.geocoder,
                address_sink,
            ),
            directions: DirectionsTracker::new(services.router, route_sink),
            geocode_completions: services.geocode_completions,
            route_completions: services.route_completions,
            last_action: None,
            options,
        })
    }

    /// The screen became visible: run the location checks and center on the user
    pub fn activate(&mut self) -> LocationAction {
        let action = self.tracker.check_authorization(&mut self.location);
        if let LocationAction::StartTracking {
            region: Some(region),
        } = action
        {
            if region == self.viewport.region() && self.throttle.last_accepted_center().is_none() {
                // Already showing the user's region; still resolve it once
                self.viewport.emit(MapEvent::CenterChanged {
                    center: region.center,
                });
            } else {
                self.viewport.set_region(region);
            }
        }
        self.last_action = Some(action);
        action
    }

    /// The platform reported a new authorization status.
    ///
    /// `status` is queued as a [`MapEvent::AuthorizationChanged`]; the next
    /// action is decided from the provider's own status, which is authoritative.
    pub fn on_authorization_changed(&mut self, status: AuthorizationStatus) -> LocationAction {
        let current = self.location.authorization_status();
        if current != status {
            log::warn!(
                "authorization notification {:?} disagrees with provider status {:?}",
                status,
                current
            );
        } else {
            log::debug!("authorization changed to {:?}", status);
        }
        self.viewport.emit(MapEvent::AuthorizationChanged { status });
        self.activate()
    }

    /// A batch of position fixes arrived; the map follows the newest
    pub fn on_locations_updated(&mut self, locations: &[LatLng]) {
        if let Some(region) = self.tracker.region_for_update(locations) {
            self.viewport.emit(MapEvent::LocationUpdated {
                location: region.center,
            });
            self.viewport.set_region(region);
        }
    }

    /// User-driven movement of the map
    pub fn pan_to(&mut self, center: LatLng) {
        self.viewport.set_center(center);
    }

    /// Drain viewport events, feeding center changes to the throttle
    pub fn process_events(&mut self) -> Vec<MapEvent> {
        let events = self.viewport.process_events();
        for event in &events {
            if let MapEvent::CenterChanged { center } = event {
                self.throttle.on_viewport_moved(*center);
            }
        }
        events
    }

    /// Deliver finished lookups. Returns how many outcomes were published.
    pub fn pump_completions(&mut self) -> usize {
        let mut published = 0;

        for completion in self.geocode_completions.try_iter() {
            if self
                .throttle
                .on_geocode_result(completion.handle, completion.result)
            {
                published += 1;
            }
        }

        for completion in self.route_completions.try_iter() {
            if self
                .directions
                .on_route_result(completion.handle, completion.result)
            {
                published += 1;
            }
        }

        published
    }

    pub fn tick(&mut self) -> usize {
        self.process_events();
        self.pump_completions()
    }

    /// Directions from the user's position to the current map center
    pub fn request_directions(&mut self, transport: TransportType) -> Result<RequestHandle> {
        let origin = self
            .location
            .current_position()
            .ok_or(Error::LocationUnavailable)?;
        let destination = self.viewport.current_center();
        Ok(self.directions.request(origin, destination, transport))
    }

    /// The screen is going away: cancel everything in flight and stop updates
    pub fn teardown(&mut self) {
        self.throttle.reset();
        self.directions.reset();
        self.tracker.stop(&mut self.location);
        self.viewport.process_events();
    }

    pub fn options(&self) -> &ScreenOptions {
        &self.options
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn throttle(&self) -> &AddressResolutionThrottle<G> {
        &self.throttle
    }

    pub fn directions(&self) -> &DirectionsTracker<R> {
        &self.directions
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn location_mut(&mut self) -> &mut L {
        &mut self.location
    }

    pub fn last_action(&self) -> Option<LocationAction> {
        self.last_action
    }
}
