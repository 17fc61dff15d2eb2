//! Payment state machine.

use serde::{Deserialize, Serialize};

/// The state of a payment attempt.
///
/// State transitions:
/// ```text
/// Pending ──┬──► Completed
///           └──► Failed
/// ```
///
/// Both `Completed` and `Failed` are terminal; a payment is never
/// reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentState {
    /// Payment has been requested, awaiting the gateway's response.
    #[default]
    Pending,

    /// The gateway confirmed the charge (terminal state).
    Completed,

    /// The gateway declined or the charge errored (terminal state).
    Failed,
}

impl PaymentState {
    /// Returns true if the payment can still be resolved.
    pub fn is_pending(&self) -> bool {
        matches!(self, PaymentState::Pending)
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentState::Completed | PaymentState::Failed)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentState::Pending => "Pending",
            PaymentState::Completed => "Completed",
            PaymentState::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for PaymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
