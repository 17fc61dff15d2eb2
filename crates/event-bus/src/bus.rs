//! Kind-keyed subscription registry and synchronous dispatch.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::event::BusEvent;

/// Error type handlers may return; logged by the bus, never propagated.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Identifies one subscription, for later [`EventBus::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

impl std::fmt::Display for HandlerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "handler#{}", self.0)
    }
}

/// A subscriber invoked synchronously for each matching event.
///
/// Any `Fn(&E) -> Result<(), HandlerError>` closure qualifies through the
/// blanket implementation; named types can implement the trait directly to
/// give the bus a useful name for its logs.
pub trait EventHandler<E>: Send + Sync {
    /// Name used when logging handler failures.
    fn name(&self) -> &'static str {
        "anonymous"
    }

    /// Handles one event. An `Err` is logged by the bus; delivery to the
    /// remaining handlers continues.
    fn handle(&self, event: &E) -> Result<(), HandlerError>;
}

impl<E, F> EventHandler<E> for F
where
    F: Fn(&E) -> Result<(), HandlerError> + Send + Sync,
{
    fn handle(&self, event: &E) -> Result<(), HandlerError> {
        self(event)
    }
}

struct Registration<E: BusEvent> {
    id: HandlerId,
    handler: Arc<dyn EventHandler<E>>,
}

impl<E: BusEvent> Clone for Registration<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            handler: Arc::clone(&self.handler),
        }
    }
}

/// In-process publish/subscribe bus.
///
/// Delivery contract:
/// - handlers for a kind run synchronously on the publisher's thread, in
///   registration order;
/// - a failing handler is logged and skipped, later handlers still run
///   (at-most-once delivery per handler, no retry);
/// - no ordering is defined across different kinds;
/// - a handler registered while a publish is in flight may or may not see
///   that event, since dispatch works off a snapshot of the registry.
pub struct EventBus<E: BusEvent> {
    registry: RwLock<HashMap<E::Kind, Vec<Registration<E>>>>,
    next_id: AtomicU64,
}

impl<E: BusEvent> EventBus<E> {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Registers a handler for the given event kind.
    ///
    /// Multiple handlers per kind are allowed; within a kind they are
    /// invoked in the order they were registered.
    pub fn subscribe(&self, kind: E::Kind, handler: Arc<dyn EventHandler<E>>) -> HandlerId {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut registry = self.write_registry();
        registry
            .entry(kind)
            .or_default()
            .push(Registration { id, handler });
        id
    }

    /// Registers a closure for the given event kind.
    pub fn subscribe_fn<F>(&self, kind: E::Kind, f: F) -> HandlerId
    where
        F: Fn(&E) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.subscribe(kind, Arc::new(f))
    }

    /// Removes a previously registered handler.
    ///
    /// Returns `false` (a no-op) if the subscription was not found.
    pub fn unsubscribe(&self, kind: E::Kind, id: HandlerId) -> bool {
        let mut registry = self.write_registry();
        match registry.get_mut(&kind) {
            Some(regs) => {
                let before = regs.len();
                regs.retain(|reg| reg.id != id);
                regs.len() != before
            }
            None => false,
        }
    }

    /// Publishes an event to every handler registered for its kind.
    ///
    /// The handler list is snapshotted under the read lock and the lock is
    /// released before any handler runs, so handlers may subscribe or
    /// publish themselves without deadlocking.
    pub fn publish(&self, event: &E) {
        let kind = event.kind();
        let snapshot: Vec<Registration<E>> = {
            let registry = self.read_registry();
            match registry.get(&kind) {
                Some(regs) => regs.clone(),
                None => {
                    tracing::debug!(?kind, "no handlers registered for event");
                    return;
                }
            }
        };

        for reg in snapshot {
            if let Err(error) = reg.handler.handle(event) {
                tracing::error!(
                    ?kind,
                    handler = reg.handler.name(),
                    subscription = %reg.id,
                    %error,
                    "event handler failed, continuing with remaining handlers"
                );
            }
        }
    }

    /// Returns how many handlers are registered for a kind.
    pub fn handler_count(&self, kind: E::Kind) -> usize {
        self.read_registry().get(&kind).map_or(0, Vec::len)
    }

    /// Returns every kind that currently has at least one handler.
    pub fn registered_kinds(&self) -> Vec<E::Kind> {
        self.read_registry()
            .iter()
            .filter(|(_, regs)| !regs.is_empty())
            .map(|(kind, _)| *kind)
            .collect()
    }

    fn read_registry(&self) -> std::sync::RwLockReadGuard<'_, HashMap<E::Kind, Vec<Registration<E>>>> {
        self.registry.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_registry(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<E::Kind, Vec<Registration<E>>>> {
        self.registry.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl<E: BusEvent> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}
