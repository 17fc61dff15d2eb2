//! Order state machine.

use serde::{Deserialize, Serialize};

/// The state of an order in its lifecycle.
///
/// State transitions:
/// ```text
/// Created ──► Submitted ──► Paid
///    │            │
///    └────────────┴──► Cancelled
/// ```
///
/// `Paid` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderState {
    /// Order is being assembled, items can be added.
    #[default]
    Created,

    /// Order was submitted and is being processed by the saga.
    Submitted,

    /// Payment confirmed and logistics arranged (terminal state).
    Paid,

    /// Order was cancelled (terminal state).
    Cancelled,
}

impl OrderState {
    /// Returns true if items can be added in this state.
    pub fn can_modify_items(&self) -> bool {
        matches!(self, OrderState::Created)
    }

    /// Returns true if the order can be submitted.
    pub fn can_submit(&self) -> bool {
        matches!(self, OrderState::Created)
    }

    /// Returns true if the order can be marked as paid.
    pub fn can_mark_paid(&self) -> bool {
        matches!(self, OrderState::Submitted)
    }

    /// Returns true if the order can be cancelled.
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderState::Created | OrderState::Submitted)
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderState::Paid | OrderState::Cancelled)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Created => "Created",
            OrderState::Submitted => "Submitted",
            OrderState::Paid => "Paid",
            OrderState::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
