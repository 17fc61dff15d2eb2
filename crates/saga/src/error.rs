//! Saga error types.

use std::time::Duration;

use common::OrderId;
use domain::{OrderError, PaymentError, ValidationReport};
use storage::StorageError;
use thiserror::Error;

/// Errors surfaced while running a saga.
#[derive(Debug, Error)]
pub enum SagaError {
    /// A step returned an error; the report names the step and the cause.
    #[error("saga step '{step}' failed: {reason}")]
    StepFailed { step: &'static str, reason: String },

    /// A step did not finish within the configured timeout.
    #[error("saga step '{step}' timed out after {timeout:?}")]
    StepTimedOut {
        step: &'static str,
        timeout: Duration,
    },

    /// The payment gateway declined the charge.
    #[error("payment declined: {0}")]
    PaymentDeclined(String),

    /// The payment gateway could not process the request at all.
    #[error("payment gateway error: {0}")]
    PaymentGateway(String),

    /// The logistics provider could not create the delivery order.
    #[error("logistics error: {0}")]
    Logistics(String),

    /// No order with the given ID is stored.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// The order is not in a state the workflow can process.
    #[error("order not ready: {0}")]
    OrderNotReady(String),

    /// The order failed business-rule validation.
    #[error(transparent)]
    Validation(#[from] ValidationReport),

    /// An order state transition was rejected.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// A payment state transition was rejected.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// The persistence layer failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
