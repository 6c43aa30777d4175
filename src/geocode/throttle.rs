use super::{Address, AddressOutcome, AddressSink, GeocodeError, GeocodingService, Placemark};
use crate::core::config::ThrottleConfig;
use crate::core::geo::LatLng;
use crate::request::{InFlight, RequestHandle};

/// Whether a lookup is currently outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleState {
    Idle,
    Resolving,
}

/// What happened to a viewport movement
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveDecision {
    /// A lookup was issued under `handle`, cancelling `superseded` if one was in flight
    Accepted {
        handle: RequestHandle,
        superseded: Option<RequestHandle>,
        /// Distance from the previous accepted center; `None` for the first observation
        distance: Option<f64>,
    },
    /// Movement below the threshold; nothing changed
    Rejected { distance: f64 },
}

impl MoveDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, MoveDecision::Accepted { .. })
    }
}

/// Turns frequent map movements into infrequent, non-overlapping address lookups.
///
/// A movement is accepted when it is the first one seen or lies at least
/// `threshold_meters` from the last accepted center. Accepting records the new
/// center immediately, cancels whatever lookup is outstanding and issues a new
/// one. Only the result of the latest lookup is ever published; completions
/// carrying any other handle are dropped without reaching the sink.
///
/// All methods must be called from the single context that owns the throttle.
pub struct AddressResolutionThrottle<G> {
    config: ThrottleConfig,
    service: G,
    sink: Box<dyn AddressSink>,
    last_accepted_center: Option<LatLng>,
    pending: InFlight,
}

impl<G: GeocodingService> AddressResolutionThrottle<G> {
    pub fn new(config: ThrottleConfig, service: G, sink: Box<dyn AddressSink>) -> Self {
        Self {
            config,
            service,
            sink,
            last_accepted_center: None,
            pending: InFlight::new(),
        }
    }

    pub fn on_viewport_moved(&mut self, new_center: LatLng) -> MoveDecision {
        let distance = self
            .last_accepted_center
            .map(|last| last.distance_to(&new_center));

        if let Some(distance) = distance {
            if distance < self.config.threshold_meters {
                log::trace!(
                    "ignoring movement to {} ({:.1} m < {:.1} m)",
                    new_center,
                    distance,
                    self.config.threshold_meters
                );
                return MoveDecision::Rejected { distance };
            }
        }

        self.last_accepted_center = Some(new_center);

        let superseded = self.pending.clear();
        if let Some(old) = superseded {
            log::debug!("cancelling superseded lookup {}", old);
            self.service.cancel(old);
        }

        let handle = self.service.lookup(new_center);
        self.pending.replace(handle);
        log::debug!("resolving address for {} as {}", new_center, handle);

        MoveDecision::Accepted {
            handle,
            superseded,
            distance,
        }
    }

    /// Feed a lookup completion back in. Returns true if an outcome was published.
    pub fn on_geocode_result(
        &mut self,
        handle: RequestHandle,
        result: Result<Vec<Placemark>, GeocodeError>,
    ) -> bool {
        if !self.pending.take(handle) {
            log::trace!("discarding stale geocode result {}", handle);
            return false;
        }

        let outcome = match result {
            Ok(placemarks) => match Address::primary(&placemarks) {
                Some(address) => {
                    log::info!("resolved address: {}", address);
                    AddressOutcome::Resolved(address)
                }
                None => {
                    log::info!("no address available for lookup {}", handle);
                    AddressOutcome::NoAddressFound
                }
            },
            Err(err) => {
                log::warn!("address resolution failed: {}", err);
                AddressOutcome::ResolutionFailed(err)
            }
        };

        self.sink.on_address_resolved(outcome);
        true
    }

    /// Cancel any outstanding lookup and forget the last accepted center
    pub fn reset(&mut self) {
        if let Some(handle) = self.pending.clear() {
            self.service.cancel(handle);
        }
        self.last_accepted_center = None;
    }

    pub fn state(&self) -> ThrottleState {
        if self.pending.is_pending() {
            ThrottleState::Resolving
        } else {
            ThrottleState::Idle
        }
    }

    pub fn last_accepted_center(&self) -> Option<LatLng> {
        self.last_accepted_center
    }

    pub fn pending_handle(&self) -> Option<RequestHandle> {
        self.pending.current()
    }

    pub fn config(&self) -> &ThrottleConfig {
        &self.config
    }

    pub fn service(&self) -> &G {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut G {
        &mut self.service
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingGeocoder {
        lookups: Vec<(RequestHandle, LatLng)>,
        cancelled: Vec<RequestHandle>,
    }

    impl GeocodingService for RecordingGeocoder {
        fn lookup(&mut self, coordinate: LatLng) -> RequestHandle {
            let handle = RequestHandle::next();
            self.lookups.push((handle, coordinate));
            handle
        }

        fn cancel(&mut self, handle: RequestHandle) {
            self.cancelled.push(handle);
        }
    }

    fn throttle() -> (
        AddressResolutionThrottle<RecordingGeocoder>,
        Arc<Mutex<Vec<AddressOutcome>>>,
    ) {
        let published: Arc<Mutex<Vec<AddressOutcome>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = published.clone();
        let throttle = AddressResolutionThrottle::new(
            ThrottleConfig::default(),
            RecordingGeocoder::default(),
            Box::new(move |outcome: AddressOutcome| sink.lock().unwrap().push(outcome)),
        );
        (throttle, published)
    }

    #[test]
    fn test_first_movement_is_always_accepted() {
        let (mut throttle, _) = throttle();
        assert_eq!(throttle.state(), ThrottleState::Idle);

        let decision = throttle.on_viewport_moved(LatLng::new(0.0, 0.0));
        assert!(matches!(
            decision,
            MoveDecision::Accepted {
                superseded: None,
                distance: None,
                ..
            }
        ));
        assert_eq!(throttle.state(), ThrottleState::Resolving);
        assert_eq!(throttle.last_accepted_center(), Some(LatLng::new(0.0, 0.0)));
        assert_eq!(throttle.service().lookups.len(), 1);
    }

    #[test]
    fn test_small_movement_leaves_state_untouched() {
        let (mut throttle, _) = throttle();
        throttle.on_viewport_moved(LatLng::new(0.0, 0.0));
        let pending = throttle.pending_handle();

        let decision = throttle.on_viewport_moved(LatLng::new(0.0, 0.0001));
        assert!(matches!(decision, MoveDecision::Rejected { distance } if distance < 50.0));
        assert_eq!(throttle.pending_handle(), pending);
        assert_eq!(throttle.last_accepted_center(), Some(LatLng::new(0.0, 0.0)));
        assert_eq!(throttle.service().lookups.len(), 1);
        assert!(throttle.service().cancelled.is_empty());
    }

    #[test]
    fn test_distance_is_measured_from_last_accepted_center() {
        let (mut throttle, _) = throttle();
        let origin = LatLng::new(10.0, 10.0);
        throttle.on_viewport_moved(origin);

        // Creep north 30 m at a time; each step is small but the third crosses 50 m
        assert!(!throttle.on_viewport_moved(origin.offset_meters(30.0, 0.0)).is_accepted());
        assert!(!throttle.on_viewport_moved(origin.offset_meters(45.0, 0.0)).is_accepted());
        assert!(throttle.on_viewport_moved(origin.offset_meters(60.0, 0.0)).is_accepted());
        assert_eq!(throttle.service().lookups.len(), 2);
    }

    #[test]
    fn test_movement_exactly_at_threshold_is_accepted() {
        let published: Arc<Mutex<Vec<AddressOutcome>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = published.clone();
        let origin = LatLng::new(0.0, 0.0);
        let target = LatLng::new(0.0, 0.001);
        let exact = origin.distance_to(&target);

        let mut throttle = AddressResolutionThrottle::new(
            ThrottleConfig {
                threshold_meters: exact,
            },
            RecordingGeocoder::default(),
            Box::new(move |outcome: AddressOutcome| sink.lock().unwrap().push(outcome)),
        );
        throttle.on_viewport_moved(origin);
        assert!(throttle.on_viewport_moved(target).is_accepted());
    }

    #[test]
    fn test_accepted_movement_cancels_in_flight_lookup() {
        let (mut throttle, _) = throttle();
        let first = throttle.on_viewport_moved(LatLng::new(0.0, 0.0));
        let MoveDecision::Accepted { handle: h1, .. } = first else {
            panic!("first movement must be accepted");
        };

        let second = throttle.on_viewport_moved(LatLng::new(0.0, 0.001));
        let MoveDecision::Accepted {
            handle: h2,
            superseded,
            ..
        } = second
        else {
            panic!("second movement must be accepted");
        };

        assert_eq!(superseded, Some(h1));
        assert_eq!(throttle.service().cancelled, vec![h1]);
        assert_eq!(throttle.pending_handle(), Some(h2));
        assert_eq!(throttle.state(), ThrottleState::Resolving);
    }

    #[test]
    fn test_stale_result_never_reaches_sink() {
        let (mut throttle, published) = throttle();
        throttle.on_viewport_moved(LatLng::new(0.0, 0.0));
        let pending = throttle.pending_handle();

        let published_any = throttle.on_geocode_result(
            RequestHandle::next(),
            Ok(vec![Placemark::street("1", "Elm St")]),
        );
        assert!(!published_any);
        assert!(published.lock().unwrap().is_empty());
        assert_eq!(throttle.pending_handle(), pending);
    }

    #[test]
    fn test_each_outcome_returns_to_idle() {
        let cases = vec![
            (
                Ok(vec![Placemark::street("5", "Oak Rd")]),
                AddressOutcome::Resolved(
                    Address::from_placemark(&Placemark::street("5", "Oak Rd")).unwrap(),
                ),
            ),
            (Ok(vec![]), AddressOutcome::NoAddressFound),
            (
                Err(GeocodeError::Network("timed out".into())),
                AddressOutcome::ResolutionFailed(GeocodeError::Network("timed out".into())),
            ),
        ];

        for (result, expected) in cases {
            let (mut throttle, published) = throttle();
            throttle.on_viewport_moved(LatLng::new(1.0, 1.0));
            let handle = throttle.pending_handle().unwrap();

            assert!(throttle.on_geocode_result(handle, result));
            assert_eq!(throttle.state(), ThrottleState::Idle);
            assert_eq!(throttle.pending_handle(), None);
            assert_eq!(*published.lock().unwrap(), vec![expected]);

            // A duplicate delivery of the same completion is stale by now
            assert!(!throttle.on_geocode_result(handle, Ok(vec![])));
            assert_eq!(published.lock().unwrap().len(), 1);
        }
    }

    #[test]
    fn test_no_retry_after_failure() {
        let (mut throttle, _) = throttle();
        throttle.on_viewport_moved(LatLng::new(1.0, 1.0));
        let handle = throttle.pending_handle().unwrap();
        throttle.on_geocode_result(handle, Err(GeocodeError::Parse("bad".into())));

        assert_eq!(throttle.service().lookups.len(), 1);
        // Nearby movement is still throttled against the failed center
        assert!(!throttle.on_viewport_moved(LatLng::new(1.0, 1.0001)).is_accepted());
    }

    #[test]
    fn test_reset_cancels_and_forgets_center() {
        let (mut throttle, _) = throttle();
        throttle.on_viewport_moved(LatLng::new(1.0, 1.0));
        let handle = throttle.pending_handle().unwrap();

        throttle.reset();
        assert_eq!(throttle.service().cancelled, vec![handle]);
        assert_eq!(throttle.state(), ThrottleState::Idle);
        assert_eq!(throttle.last_accepted_center(), None);
        assert!(throttle.on_viewport_moved(LatLng::new(1.0, 1.0)).is_accepted());
    }
}
