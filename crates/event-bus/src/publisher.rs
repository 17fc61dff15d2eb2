//! Publisher handle injected into services that raise events.

use std::sync::{Arc, RwLock};

use crate::bus::EventBus;
use crate::event::BusEvent;

/// Clonable handle through which services forward domain events to the bus.
///
/// The handle is passed in explicitly wherever events are raised; there is
/// no process-wide static. Until [`bind`](EventPublisher::bind) wires a bus
/// in, publishing degrades to a logged warning; raising an event must
/// never fail the operation that raised it because of a wiring problem.
pub struct EventPublisher<E: BusEvent> {
    bus: Arc<RwLock<Option<Arc<EventBus<E>>>>>,
}

impl<E: BusEvent> Clone for EventPublisher<E> {
    fn clone(&self) -> Self {
        Self {
            bus: Arc::clone(&self.bus),
        }
    }
}

impl<E: BusEvent> EventPublisher<E> {
    /// Creates a publisher with no bus attached.
    pub fn unbound() -> Self {
        Self {
            bus: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a publisher already bound to a bus.
    pub fn bound(bus: Arc<EventBus<E>>) -> Self {
        Self {
            bus: Arc::new(RwLock::new(Some(bus))),
        }
    }

    /// Binds (or rebinds) the bus this publisher forwards to.
    ///
    /// All clones of this handle see the new binding.
    pub fn bind(&self, bus: Arc<EventBus<E>>) {
        *self.write_slot() = Some(bus);
    }

    /// Detaches the bus; subsequent publishes become logged no-ops.
    pub fn unbind(&self) {
        *self.write_slot() = None;
    }

    /// Returns true if a bus is currently attached.
    pub fn is_bound(&self) -> bool {
        self.read_slot().is_some()
    }

    /// Forwards an event to the bound bus.
    ///
    /// With no bus bound this logs a warning and drops the event. It never
    /// panics and never returns an error.
    pub fn publish(&self, event: &E) {
        let bus = self.read_slot().clone();
        match bus {
            Some(bus) => bus.publish(event),
            None => {
                tracing::warn!(
                    kind = ?event.kind(),
                    "domain event dropped: no event bus bound to publisher"
                );
            }
        }
    }

    /// Publishes a batch of events in order.
    pub fn publish_all<'a>(&self, events: impl IntoIterator<Item = &'a E>)
    where
        E: 'a,
    {
        for event in events {
            self.publish(event);
        }
    }

    fn read_slot(&self) -> std::sync::RwLockReadGuard<'_, Option<Arc<EventBus<E>>>> {
        self.bus.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_slot(&self) -> std::sync::RwLockWriteGuard<'_, Option<Arc<EventBus<E>>>> {
        self.bus.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl<E: BusEvent> Default for EventPublisher<E> {
    fn default() -> Self {
        Self::unbound()
    }
}
