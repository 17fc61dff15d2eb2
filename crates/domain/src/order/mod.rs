//! Order aggregate and related types.

mod aggregate;
mod state;
mod validator;
mod value_objects;

pub use aggregate::Order;
pub use state::OrderState;
pub use validator::{OrderLimits, OrderValidator, RuleViolation, ValidationReport};
pub use value_objects::{CustomerId, Money, OrderItem, ProductId};

use thiserror::Error;

/// Errors raised when constructing or mutating an order.
///
/// These are always recoverable by the caller and never leave the order
/// partially mutated.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Customer ID is required.
    #[error("customer id is required")]
    CustomerIdRequired,

    /// Shipping address is required.
    #[error("shipping address is required")]
    ShippingAddressRequired,

    /// Order is not in the expected state.
    #[error("invalid state transition: cannot {action} from {current_state} state")]
    InvalidStateTransition {
        current_state: OrderState,
        action: &'static str,
    },

    /// Invalid quantity.
    #[error("invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// Invalid unit price.
    #[error("invalid unit price: {price} cents (must be greater than 0)")]
    InvalidPrice { price: i64 },

    /// Order has no items.
    #[error("order has no items")]
    NoItems,
}
