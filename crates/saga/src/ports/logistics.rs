//! Logistics port.
//!
//! The provider exposes no cancellation call, so a delivery order created
//! before a later step fails is left in place. Cancellation support is
//! tracked as a gap in the provider contract, not papered over here.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::OrderId;

use crate::error::SagaError;

/// Confirmation from the logistics provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryTicket {
    pub delivery_id: String,
}

/// Outbound port to the logistics provider.
#[async_trait]
pub trait LogisticsService: Send + Sync {
    /// Registers a delivery order for a paid order.
    async fn create_delivery_order(&self, order_id: OrderId) -> Result<DeliveryTicket, SagaError>;
}

#[derive(Debug, Default)]
struct LogisticsState {
    deliveries: HashMap<String, OrderId>,
    next_id: u32,
    fail_on_create: bool,
}

/// In-memory logistics provider for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLogisticsService {
    state: Arc<RwLock<LogisticsState>>,
}

impl InMemoryLogisticsService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent delivery-order creation fail.
    pub fn set_fail_on_create(&self, fail: bool) {
        self.state.write().unwrap().fail_on_create = fail;
    }

    /// Number of delivery orders created.
    pub fn delivery_count(&self) -> usize {
        self.state.read().unwrap().deliveries.len()
    }

    /// Returns true if a delivery order exists for the given order.
    pub fn has_delivery_for(&self, order_id: OrderId) -> bool {
        self.state
            .read()
            .unwrap()
            .deliveries
            .values()
            .any(|id| *id == order_id)
    }
}

#[async_trait]
impl LogisticsService for InMemoryLogisticsService {
    async fn create_delivery_order(&self, order_id: OrderId) -> Result<DeliveryTicket, SagaError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_create {
            return Err(SagaError::Logistics("no carrier capacity".into()));
        }
        state.next_id += 1;
        let delivery_id = format!("DLV-{:04}", state.next_id);
        state.deliveries.insert(delivery_id.clone(), order_id);
        tracing::debug!(%order_id, %delivery_id, "delivery order created");
        Ok(DeliveryTicket { delivery_id })
    }
}
