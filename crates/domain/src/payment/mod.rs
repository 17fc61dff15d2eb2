//! Payment aggregate and related types.

mod aggregate;
mod state;

pub use aggregate::Payment;
pub use state::PaymentState;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a charge is presented to the payment gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    /// Charge a credit card.
    #[default]
    CreditCard,

    /// Charge a debit card.
    DebitCard,

    /// Charge a stored-value wallet.
    Wallet,
}

impl PaymentMethod {
    /// Returns the method name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "CreditCard",
            PaymentMethod::DebitCard => "DebitCard",
            PaymentMethod::Wallet => "Wallet",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors raised when constructing or mutating a payment.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Payment amount must be strictly positive.
    #[error("invalid payment amount: {cents} cents (must be greater than 0)")]
    InvalidAmount { cents: i64 },

    /// Payment is not in the expected state.
    #[error("invalid state transition: cannot {action} from {current_state} state")]
    InvalidStateTransition {
        current_state: PaymentState,
        action: &'static str,
    },
}
