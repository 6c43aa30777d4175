use crate::core::geo::{LatLng, LatLngBounds, Region};
use crate::events::{EventManager, MapEvent};

/// The map-side port: something that shows a region and reports center changes
pub trait MapViewport {
    /// The coordinate currently at the center of the map
    fn current_center(&self) -> LatLng;

    /// Register a listener invoked for every center change
    fn on_center_changed(&mut self, callback: Box<dyn Fn(LatLng) + Send + Sync>);
}

/// Manages the current view of the map and queues change notifications
#[derive(Debug)]
pub struct Viewport {
    region: Region,
    events: EventManager,
}

impl Viewport {
    /// Creates a new viewport showing `region`; no event is queued for the initial view
    pub fn new(region: Region) -> Self {
        Self {
            region,
            events: EventManager::new(),
        }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn bounds(&self) -> LatLngBounds {
        self.region.bounds()
    }

    /// Moves the map, keeping the current region size
    pub fn set_center(&mut self, center: LatLng) {
        let region = Region {
            center,
            ..self.region
        };
        self.set_region(region);
    }

    /// Shows a new region; center listeners only fire when the center actually moved
    pub fn set_region(&mut self, region: Region) {
        if region == self.region {
            return;
        }
        let center_moved = region.center != self.region.center;
        self.region = region;

        self.events.emit(MapEvent::RegionChanged { region });
        if center_moved {
            self.events.emit(MapEvent::CenterChanged {
                center: region.center,
            });
        }
    }

    /// Queue an arbitrary map event for the next `process_events` pass
    pub fn emit(&mut self, event: MapEvent) {
        self.events.emit(event);
    }

    /// Drain queued events, notifying listeners, and hand them to the owner
    pub fn process_events(&mut self) -> Vec<MapEvent> {
        self.events.process_events()
    }

    pub fn pending_events(&self) -> usize {
        self.events.pending_events()
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(Region::default())
    }
}

impl MapViewport for Viewport {
    fn current_center(&self) -> LatLng {
        self.region.center
    }

    fn on_center_changed(&mut self, callback: Box<dyn Fn(LatLng) + Send + Sync>) {
        self.events.on("centerchanged", move |event| {
            if let MapEvent::CenterChanged { center } = event {
                callback(*center);
            }
        });
    }
}
