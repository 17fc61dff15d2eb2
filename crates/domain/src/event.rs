//! Domain events raised by the order and payment aggregates.

use chrono::{DateTime, Utc};
use common::{EventId, OrderId, PaymentId};
use event_bus::BusEvent;
use serde::{Deserialize, Serialize};

use crate::order::{CustomerId, Money, OrderItem, ProductId};

/// An immutable record of something that happened to an aggregate.
///
/// Every event carries a unique id and the moment it occurred; the payload
/// holds the domain-specific fields. Events are never mutated after
/// creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event id.
    pub id: EventId,

    /// When the state transition happened.
    pub occurred_at: DateTime<Utc>,

    /// Event-specific fields.
    pub payload: DomainEventPayload,
}

/// Statically enumerated discriminator for [`DomainEvent`] payloads.
///
/// The event bus keys its dispatch table on this enum, so the full set of
/// event kinds is visible at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DomainEventKind {
    OrderCreated,
    OrderItemAdded,
    OrderSubmitted,
    OrderPaid,
    OrderCancelled,
    PaymentRequested,
    PaymentFailed,
}

impl DomainEventKind {
    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainEventKind::OrderCreated => "OrderCreated",
            DomainEventKind::OrderItemAdded => "OrderItemAdded",
            DomainEventKind::OrderSubmitted => "OrderSubmitted",
            DomainEventKind::OrderPaid => "OrderPaid",
            DomainEventKind::OrderCancelled => "OrderCancelled",
            DomainEventKind::PaymentRequested => "PaymentRequested",
            DomainEventKind::PaymentFailed => "PaymentFailed",
        }
    }
}

impl std::fmt::Display for DomainEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Event-specific payload data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum DomainEventPayload {
    /// An order was created.
    OrderCreated(OrderCreatedData),

    /// A line item was added to an order.
    OrderItemAdded(OrderItemAddedData),

    /// An order was submitted for processing.
    OrderSubmitted(OrderSubmittedData),

    /// An order was paid (saga happy path completed).
    OrderPaid(OrderPaidData),

    /// An order was cancelled.
    OrderCancelled(OrderCancelledData),

    /// A payment attempt was created.
    PaymentRequested(PaymentRequestedData),

    /// A payment attempt failed.
    PaymentFailed(PaymentFailedData),
}

/// Data for OrderCreated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreatedData {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
}

/// Data for OrderItemAdded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemAddedData {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Money,
    /// Order total after the item was added.
    pub new_total: Money,
}

/// Data for OrderSubmitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSubmittedData {
    pub order_id: OrderId,
    pub total_amount: Money,
    pub item_count: usize,
}

/// Data for OrderPaid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPaidData {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub total_amount: Money,
}

/// Data for OrderCancelled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCancelledData {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub reason: String,
}

/// Data for PaymentRequested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequestedData {
    pub payment_id: PaymentId,
    pub order_id: OrderId,
    pub amount: Money,
}

/// Data for PaymentFailed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentFailedData {
    pub payment_id: PaymentId,
    pub order_id: OrderId,
    pub reason: String,
}

impl DomainEvent {
    fn with_payload(payload: DomainEventPayload) -> Self {
        Self {
            id: EventId::new(),
            occurred_at: Utc::now(),
            payload,
        }
    }

    /// Creates an OrderCreated event.
    pub fn order_created(order_id: OrderId, customer_id: CustomerId) -> Self {
        Self::with_payload(DomainEventPayload::OrderCreated(OrderCreatedData {
            order_id,
            customer_id,
        }))
    }

    /// Creates an OrderItemAdded event.
    pub fn order_item_added(order_id: OrderId, item: &OrderItem, new_total: Money) -> Self {
        Self::with_payload(DomainEventPayload::OrderItemAdded(OrderItemAddedData {
            order_id,
            product_id: item.product_id.clone(),
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            new_total,
        }))
    }

    /// Creates an OrderSubmitted event.
    pub fn order_submitted(order_id: OrderId, total_amount: Money, item_count: usize) -> Self {
        Self::with_payload(DomainEventPayload::OrderSubmitted(OrderSubmittedData {
            order_id,
            total_amount,
            item_count,
        }))
    }

    /// Creates an OrderPaid event.
    pub fn order_paid(order_id: OrderId, customer_id: CustomerId, total_amount: Money) -> Self {
        Self::with_payload(DomainEventPayload::OrderPaid(OrderPaidData {
            order_id,
            customer_id,
            total_amount,
        }))
    }

    /// Creates an OrderCancelled event.
    pub fn order_cancelled(
        order_id: OrderId,
        customer_id: CustomerId,
        reason: impl Into<String>,
    ) -> Self {
        Self::with_payload(DomainEventPayload::OrderCancelled(OrderCancelledData {
            order_id,
            customer_id,
            reason: reason.into(),
        }))
    }

    /// Creates a PaymentRequested event.
    pub fn payment_requested(payment_id: PaymentId, order_id: OrderId, amount: Money) -> Self {
        Self::with_payload(DomainEventPayload::PaymentRequested(PaymentRequestedData {
            payment_id,
            order_id,
            amount,
        }))
    }

    /// Creates a PaymentFailed event.
    pub fn payment_failed(
        payment_id: PaymentId,
        order_id: OrderId,
        reason: impl Into<String>,
    ) -> Self {
        Self::with_payload(DomainEventPayload::PaymentFailed(PaymentFailedData {
            payment_id,
            order_id,
            reason: reason.into(),
        }))
    }

    /// Returns the event-kind discriminator.
    pub fn kind(&self) -> DomainEventKind {
        match &self.payload {
            DomainEventPayload::OrderCreated(_) => DomainEventKind::OrderCreated,
            DomainEventPayload::OrderItemAdded(_) => DomainEventKind::OrderItemAdded,
            DomainEventPayload::OrderSubmitted(_) => DomainEventKind::OrderSubmitted,
            DomainEventPayload::OrderPaid(_) => DomainEventKind::OrderPaid,
            DomainEventPayload::OrderCancelled(_) => DomainEventKind::OrderCancelled,
            DomainEventPayload::PaymentRequested(_) => DomainEventKind::PaymentRequested,
            DomainEventPayload::PaymentFailed(_) => DomainEventKind::PaymentFailed,
        }
    }

    /// Returns the event type name.
    pub fn event_type(&self) -> &'static str {
        self.kind().as_str()
    }
}

impl BusEvent for DomainEvent {
    type Kind = DomainEventKind;

    fn kind(&self) -> DomainEventKind {
        DomainEvent::kind(self)
    }
}
