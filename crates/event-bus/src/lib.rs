//! In-process domain event bus.
//!
//! This crate decouples event producers from consumers through a
//! kind-keyed subscription registry:
//! - [`BusEvent`] is implemented by the event union of the domain; its
//!   `Kind` discriminator is a statically enumerated enum, so the
//!   dispatch table is inspectable data rather than runtime type lookups.
//! - [`EventBus`] delivers each published event synchronously to every
//!   handler registered for its kind, in registration order. A handler
//!   failure is logged and does not stop delivery to later handlers.
//! - [`EventPublisher`] is the handle services hold to emit events. It is
//!   explicitly injected (no global state) and degrades to a logged no-op
//!   while no bus is bound, so raising an event can never fail the
//!   operation that raised it.

pub mod bus;
pub mod event;
pub mod publisher;

pub use bus::{EventBus, EventHandler, HandlerError, HandlerId};
pub use event::BusEvent;
pub use publisher::EventPublisher;
