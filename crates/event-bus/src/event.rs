//! Event trait consumed by the bus.

use std::fmt::Debug;
use std::hash::Hash;

/// Trait for events that can travel over the [`EventBus`](crate::EventBus).
///
/// Implementations are expected to be tagged unions: one enum covering
/// every event the system can raise, with `Kind` as the matching
/// field-less discriminator enum. Subscriptions are keyed by `Kind`.
pub trait BusEvent: Send + Sync {
    /// The statically enumerated event-kind discriminator.
    type Kind: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    /// Returns the kind of this event, used for handler lookup.
    fn kind(&self) -> Self::Kind;
}
