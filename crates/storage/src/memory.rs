//! In-memory repository adapters.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, PaymentId};
use domain::{Order, Payment};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::repository::{OrderRepository, PaymentRepository};

/// In-memory order repository.
///
/// Clones share the same backing map, so a service and its tests can hold
/// separate handles to one store. Writes are immediately visible to
/// subsequent reads on any handle.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn count(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn save(&self, order: &Order) -> Result<()> {
        self.orders.write().await.insert(order.id(), order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Order>> {
        Ok(self.orders.read().await.values().cloned().collect())
    }

    async fn delete(&self, id: OrderId) -> Result<bool> {
        Ok(self.orders.write().await.remove(&id).is_some())
    }

    async fn exists(&self, id: OrderId) -> Result<bool> {
        Ok(self.orders.read().await.contains_key(&id))
    }
}

/// In-memory payment repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentRepository {
    payments: Arc<RwLock<HashMap<PaymentId, Payment>>>,
}

impl InMemoryPaymentRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored payments.
    pub async fn count(&self) -> usize {
        self.payments.read().await.len()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn save(&self, payment: &Payment) -> Result<()> {
        self.payments
            .write()
            .await
            .insert(payment.id(), payment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>> {
        Ok(self.payments.read().await.get(&id).cloned())
    }

    async fn find_by_order_id(&self, order_id: OrderId) -> Result<Vec<Payment>> {
        Ok(self
            .payments
            .read()
            .await
            .values()
            .filter(|payment| payment.order_id() == order_id)
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<Payment>> {
        Ok(self.payments.read().await.values().cloned().collect())
    }

    async fn delete(&self, id: PaymentId) -> Result<bool> {
        Ok(self.payments.write().await.remove(&id).is_some())
    }

    async fn exists(&self, id: PaymentId) -> Result<bool> {
        Ok(self.payments.read().await.contains_key(&id))
    }
}
