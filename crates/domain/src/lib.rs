//! Domain layer for the order-processing core.
//!
//! This crate holds the two aggregates the saga drives and the events they
//! raise:
//! - [`Order`] — `Created → Submitted → Paid`, with `Cancelled` reachable
//!   from any non-terminal state
//! - [`Payment`] — `Pending → Completed | Failed`, both terminal
//!
//! Aggregates never talk to infrastructure. A mutation validates first,
//! then updates state and returns the raised [`DomainEvent`] to the caller;
//! the orchestrating service drains those events into the event bus.

pub mod event;
pub mod order;
pub mod payment;

pub use event::{DomainEvent, DomainEventKind, DomainEventPayload};
pub use order::{
    CustomerId, Money, Order, OrderError, OrderItem, OrderLimits, OrderState, OrderValidator,
    ProductId, RuleViolation, ValidationReport,
};
pub use payment::{Payment, PaymentError, PaymentMethod, PaymentState};
