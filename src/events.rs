use crate::core::geo::{LatLng, Region};
use crate::location::AuthorizationStatus;
use crate::prelude::{HashMap, VecDeque};

/// Map event types that can be emitted by the viewport and location stack
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// The center of the visible map changed
    CenterChanged { center: LatLng },
    /// The visible region changed (center or size)
    RegionChanged { region: Region },
    /// A new user location was reported
    LocationUpdated { location: LatLng },
    /// The location authorization status changed
    AuthorizationChanged { status: AuthorizationStatus },
}

impl MapEvent {
    /// Listener key for this event
    pub fn event_type(&self) -> &'static str {
        match self {
            MapEvent::CenterChanged { .. } => "centerchanged",
            MapEvent::RegionChanged { .. } => "regionchanged",
            MapEvent::LocationUpdated { .. } => "locationupdated",
            MapEvent::AuthorizationChanged { .. } => "authorizationchanged",
        }
    }
}

/// Event listener callback type
pub type EventCallback = Box<dyn Fn(&MapEvent) + Send + Sync>;

/// Queues events and fans them out to registered listeners
#[derive(Default)]
pub struct EventManager {
    /// Event listeners by event type
    listeners: HashMap<String, Vec<EventCallback>>,
    /// Event queue for processing
    event_queue: VecDeque<MapEvent>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event listener
    pub fn on<F>(&mut self, event_type: &str, callback: F)
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        self.listeners
            .entry(event_type.to_string())
            .or_default()
            .push(Box::new(callback));
    }

    /// Emit an event to the queue
    pub fn emit(&mut self, event: MapEvent) {
        self.event_queue.push_back(event);
    }

    /// Process all queued events, returning them in emission order
    pub fn process_events(&mut self) -> Vec<MapEvent> {
        let events: Vec<_> = self.event_queue.drain(..).collect();

        for event in &events {
            if let Some(callbacks) = self.listeners.get(event.event_type()) {
                for callback in callbacks {
                    callback(event);
                }
            }
        }

        events
    }

    /// Get number of pending events
    pub fn pending_events(&self) -> usize {
        self.event_queue.len()
    }
}

impl std::fmt::Debug for EventManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventManager")
            .field("listeners", &self.listeners.len())
            .field("event_queue", &self.event_queue)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_listeners_only_see_their_event_type() {
        let mut manager = EventManager::new();
        let centers = Arc::new(AtomicUsize::new(0));
        let counter = centers.clone();
        manager.on("centerchanged", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        manager.emit(MapEvent::CenterChanged {
            center: LatLng::new(1.0, 2.0),
        });
        manager.emit(MapEvent::LocationUpdated {
            location: LatLng::new(1.0, 2.0),
        });
        assert_eq!(manager.pending_events(), 2);

        let events = manager.process_events();
        assert_eq!(events.len(), 2);
        assert_eq!(centers.load(Ordering::SeqCst), 1);
        assert_eq!(manager.pending_events(), 0);
    }
}
