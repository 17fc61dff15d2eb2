//! Payment aggregate implementation.

use chrono::{DateTime, Utc};
use common::{OrderId, PaymentId};
use serde::{Deserialize, Serialize};

use crate::event::DomainEvent;
use crate::order::Money;

use super::{PaymentError, PaymentState};

/// A single payment attempt tied 1:1 to an order.
///
/// Created in `Pending` when a payment is requested and resolved exactly
/// once to `Completed` or `Failed` by the gateway's response path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    id: PaymentId,
    order_id: OrderId,
    amount: Money,
    state: PaymentState,
    failure_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Payment {
    /// Requests a payment for an order.
    ///
    /// Fails unless the amount is strictly positive; on success the
    /// payment enters `Pending` and a `PaymentRequested` event is raised.
    pub fn request(order_id: OrderId, amount: Money) -> Result<(Self, DomainEvent), PaymentError> {
        if !amount.is_positive() {
            return Err(PaymentError::InvalidAmount {
                cents: amount.cents(),
            });
        }

        let now = Utc::now();
        let payment = Self {
            id: PaymentId::new(),
            order_id,
            amount,
            state: PaymentState::Pending,
            failure_reason: None,
            created_at: now,
            updated_at: now,
        };
        let event = DomainEvent::payment_requested(payment.id, order_id, amount);

        Ok((payment, event))
    }

    /// Marks the payment as completed.
    ///
    /// Transitions `Pending → Completed`. The state change itself is what
    /// the saga observes; no event is raised.
    pub fn mark_completed(&mut self) -> Result<(), PaymentError> {
        if !self.state.is_pending() {
            return Err(PaymentError::InvalidStateTransition {
                current_state: self.state,
                action: "mark completed",
            });
        }

        self.state = PaymentState::Completed;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Marks the payment as failed with the gateway's reason.
    ///
    /// Transitions `Pending → Failed` and raises a `PaymentFailed` event
    /// carrying the reason.
    pub fn mark_failed(&mut self, reason: impl Into<String>) -> Result<DomainEvent, PaymentError> {
        if !self.state.is_pending() {
            return Err(PaymentError::InvalidStateTransition {
                current_state: self.state,
                action: "mark failed",
            });
        }

        let reason = reason.into();
        self.state = PaymentState::Failed;
        self.failure_reason = Some(reason.clone());
        self.updated_at = Utc::now();

        Ok(DomainEvent::payment_failed(self.id, self.order_id, reason))
    }
}

// Query methods
impl Payment {
    /// Returns the payment ID.
    pub fn id(&self) -> PaymentId {
        self.id
    }

    /// Returns the owning order ID.
    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    /// Returns the payment amount.
    pub fn amount(&self) -> Money {
        self.amount
    }

    /// Returns the current state.
    pub fn state(&self) -> PaymentState {
        self.state
    }

    /// Returns the failure reason, if the payment failed.
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Returns when the payment was requested.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the payment was last updated.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
