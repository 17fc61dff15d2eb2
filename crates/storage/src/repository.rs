//! Repository port traits.

use async_trait::async_trait;
use common::{OrderId, PaymentId};
use domain::{Order, Payment};

use crate::error::Result;

/// Persistence port for order aggregates.
///
/// `save` is an upsert: it persists new orders and overwrites the stored
/// state of existing ones. The core never physically deletes an order;
/// `delete` exists for the adapters and tooling around it.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persists the order, overwriting any previous state.
    async fn save(&self, order: &Order) -> Result<()>;

    /// Loads an order by ID.
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>>;

    /// Loads every stored order.
    async fn find_all(&self) -> Result<Vec<Order>>;

    /// Removes an order; returns false if it was not stored.
    async fn delete(&self, id: OrderId) -> Result<bool>;

    /// Returns true if an order with the given ID is stored.
    async fn exists(&self, id: OrderId) -> Result<bool>;
}

/// Persistence port for payment aggregates.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Persists the payment, overwriting any previous state.
    async fn save(&self, payment: &Payment) -> Result<()>;

    /// Loads a payment by ID.
    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>>;

    /// Loads every payment attempt recorded for an order.
    async fn find_by_order_id(&self, order_id: OrderId) -> Result<Vec<Payment>>;

    /// Loads every stored payment.
    async fn find_all(&self) -> Result<Vec<Payment>>;

    /// Removes a payment; returns false if it was not stored.
    async fn delete(&self, id: PaymentId) -> Result<bool>;

    /// Returns true if a payment with the given ID is stored.
    async fn exists(&self, id: PaymentId) -> Result<bool>;
}
