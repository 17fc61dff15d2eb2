//! Persistence ports for the order-processing core.
//!
//! The core only requires conventional CRUD with read-your-writes
//! consistency within a single saga execution; anything beyond that is an
//! adapter concern. This crate defines the [`OrderRepository`] and
//! [`PaymentRepository`] ports and ships the in-memory adapters the
//! workspace runs on.

pub mod error;
pub mod memory;
pub mod repository;

pub use error::StorageError;
pub use memory::{InMemoryOrderRepository, InMemoryPaymentRepository};
pub use repository::{OrderRepository, PaymentRepository};
