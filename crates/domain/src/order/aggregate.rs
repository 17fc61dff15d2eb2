//! Order aggregate implementation.

use common::OrderId;
use serde::{Deserialize, Serialize};

use crate::event::DomainEvent;

use super::{CustomerId, Money, OrderError, OrderItem, OrderState};

/// Order aggregate root.
///
/// Commands validate first and mutate only on success, so a rejected call
/// leaves the order exactly as it was. Each successful mutation returns the
/// raised [`DomainEvent`]; the caller is responsible for handing it to the
/// event publisher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    customer_id: CustomerId,
    shipping_address: String,
    state: OrderState,
    items: Vec<OrderItem>,
    total_amount: Money,
}

impl Order {
    /// Creates a new order for a customer.
    ///
    /// Fails if the customer id or the shipping address is empty.
    pub fn create(
        customer_id: impl Into<CustomerId>,
        shipping_address: impl Into<String>,
    ) -> Result<(Self, DomainEvent), OrderError> {
        let customer_id = customer_id.into();
        let shipping_address = shipping_address.into();

        if customer_id.is_empty() {
            return Err(OrderError::CustomerIdRequired);
        }
        if shipping_address.trim().is_empty() {
            return Err(OrderError::ShippingAddressRequired);
        }

        let order = Self {
            id: OrderId::new(),
            customer_id: customer_id.clone(),
            shipping_address,
            state: OrderState::Created,
            items: Vec::new(),
            total_amount: Money::zero(),
        };
        let event = DomainEvent::order_created(order.id, customer_id);

        Ok((order, event))
    }

    /// Adds a line item to the order.
    ///
    /// Allowed only while the order is in `Created`; quantity and unit
    /// price must both be positive. The running total is updated with the
    /// item's subtotal.
    pub fn add_item(&mut self, item: OrderItem) -> Result<DomainEvent, OrderError> {
        if !self.state.can_modify_items() {
            return Err(OrderError::InvalidStateTransition {
                current_state: self.state,
                action: "add item",
            });
        }

        if item.quantity == 0 {
            return Err(OrderError::InvalidQuantity {
                quantity: item.quantity,
            });
        }

        if !item.unit_price.is_positive() {
            return Err(OrderError::InvalidPrice {
                price: item.unit_price.cents(),
            });
        }

        self.total_amount += item.subtotal();
        let event = DomainEvent::order_item_added(self.id, &item, self.total_amount);
        self.items.push(item);

        Ok(event)
    }

    /// Submits the order for processing.
    ///
    /// Transitions `Created → Submitted`; rejected if the order has no
    /// items.
    pub fn submit(&mut self) -> Result<DomainEvent, OrderError> {
        if !self.state.can_submit() {
            return Err(OrderError::InvalidStateTransition {
                current_state: self.state,
                action: "submit",
            });
        }

        if self.items.is_empty() {
            return Err(OrderError::NoItems);
        }

        self.state = OrderState::Submitted;
        Ok(DomainEvent::order_submitted(
            self.id,
            self.total_amount,
            self.items.len(),
        ))
    }

    /// Marks the order as paid.
    ///
    /// Transitions `Submitted → Paid`; invoked exclusively by the saga's
    /// happy path.
    pub fn mark_paid(&mut self) -> Result<DomainEvent, OrderError> {
        if !self.state.can_mark_paid() {
            return Err(OrderError::InvalidStateTransition {
                current_state: self.state,
                action: "mark paid",
            });
        }

        self.state = OrderState::Paid;
        Ok(DomainEvent::order_paid(
            self.id,
            self.customer_id.clone(),
            self.total_amount,
        ))
    }

    /// Cancels the order.
    ///
    /// Allowed from any non-terminal state.
    pub fn cancel(&mut self, reason: impl Into<String>) -> Result<DomainEvent, OrderError> {
        if !self.state.can_cancel() {
            return Err(OrderError::InvalidStateTransition {
                current_state: self.state,
                action: "cancel",
            });
        }

        self.state = OrderState::Cancelled;
        Ok(DomainEvent::order_cancelled(
            self.id,
            self.customer_id.clone(),
            reason,
        ))
    }
}

// Query methods
impl Order {
    /// Returns the order ID.
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Returns the customer ID.
    pub fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    /// Returns the shipping address.
    pub fn shipping_address(&self) -> &str {
        &self.shipping_address
    }

    /// Returns the current state.
    pub fn state(&self) -> OrderState {
        self.state
    }

    /// Returns the line items in the order they were added.
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Returns the number of line items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the order has at least one item.
    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }

    /// Returns the total amount.
    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    /// Returns true if the order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}
