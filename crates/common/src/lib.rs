//! Shared identifier types used across the order-processing workspace.

pub mod types;

pub use types::{EventId, OrderId, PaymentId};
