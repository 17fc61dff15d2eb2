//! Payment gateway port.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::OrderId;
use domain::{Money, PaymentMethod};

use crate::error::SagaError;

/// Proof of a successful charge, carrying the gateway's transaction ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeReceipt {
    pub transaction_id: String,
}

/// Outbound port to the payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charges the customer for an order. Returns a receipt whose
    /// transaction ID is required to refund the charge later.
    async fn charge(
        &self,
        order_id: OrderId,
        amount: Money,
        method: PaymentMethod,
    ) -> Result<ChargeReceipt, SagaError>;

    /// Refunds a previous charge identified by its transaction ID.
    async fn refund(&self, transaction_id: &str, amount: Money) -> Result<(), SagaError>;
}

#[derive(Debug, Default)]
struct GatewayState {
    charges: HashMap<String, (OrderId, Money)>,
    refunds: Vec<(String, Money)>,
    next_id: u32,
    fail_on_charge: bool,
    fail_on_refund: bool,
}

/// In-memory payment gateway for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentGateway {
    state: Arc<RwLock<GatewayState>>,
}

impl InMemoryPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent charge fail with a decline.
    pub fn set_fail_on_charge(&self, fail: bool) {
        self.state.write().unwrap().fail_on_charge = fail;
    }

    /// Makes every subsequent refund fail.
    pub fn set_fail_on_refund(&self, fail: bool) {
        self.state.write().unwrap().fail_on_refund = fail;
    }

    /// Number of charges currently held (refunded charges are released).
    pub fn charge_count(&self) -> usize {
        self.state.read().unwrap().charges.len()
    }

    /// Number of refunds processed.
    pub fn refund_count(&self) -> usize {
        self.state.read().unwrap().refunds.len()
    }

    /// Returns true if a charge with the given transaction ID is held.
    pub fn has_charge(&self, transaction_id: &str) -> bool {
        self.state.read().unwrap().charges.contains_key(transaction_id)
    }

    /// Refunds processed so far, oldest first.
    pub fn refunds(&self) -> Vec<(String, Money)> {
        self.state.read().unwrap().refunds.clone()
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn charge(
        &self,
        order_id: OrderId,
        amount: Money,
        method: PaymentMethod,
    ) -> Result<ChargeReceipt, SagaError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_charge {
            return Err(SagaError::PaymentDeclined("insufficient funds".into()));
        }
        state.next_id += 1;
        let transaction_id = format!("TXN-{:04}", state.next_id);
        state
            .charges
            .insert(transaction_id.clone(), (order_id, amount));
        tracing::debug!(%order_id, %amount, %method, %transaction_id, "charge accepted");
        Ok(ChargeReceipt { transaction_id })
    }

    async fn refund(&self, transaction_id: &str, amount: Money) -> Result<(), SagaError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_refund {
            return Err(SagaError::PaymentGateway("refund channel unavailable".into()));
        }
        state.charges.remove(transaction_id);
        state.refunds.push((transaction_id.to_string(), amount));
        tracing::debug!(%transaction_id, %amount, "refund processed");
        Ok(())
    }
}
