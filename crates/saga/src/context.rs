//! Shared state threaded through the order-processing saga.

use domain::{DomainEvent, Order, Payment};

/// Mutable workflow state handed to each saga step in turn.
///
/// Steps communicate exclusively through this context: the charge step
/// records the gateway transaction ID that its own compensation later
/// refunds, and every step appends the domain events it raised so the
/// orchestrator can publish them after persistence.
#[derive(Debug)]
pub struct SagaContext {
    order: Order,
    payment: Option<Payment>,
    transaction_id: Option<String>,
    delivery_id: Option<String>,
    pending_events: Vec<DomainEvent>,
}

impl SagaContext {
    /// Starts a new workflow context around the order being processed.
    pub fn new(order: Order) -> Self {
        Self {
            order,
            payment: None,
            transaction_id: None,
            delivery_id: None,
            pending_events: Vec::new(),
        }
    }

    /// The order being processed.
    pub fn order(&self) -> &Order {
        &self.order
    }

    /// Mutable access to the order for steps that transition its state.
    pub fn order_mut(&mut self) -> &mut Order {
        &mut self.order
    }

    /// The payment attempt recorded by the charge step, if it ran.
    pub fn payment(&self) -> Option<&Payment> {
        self.payment.as_ref()
    }

    /// Records the payment attempt for later persistence.
    pub fn set_payment(&mut self, payment: Payment) {
        self.payment = Some(payment);
    }

    /// The gateway transaction ID, present once a charge succeeded.
    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    /// Records the gateway transaction ID of a successful charge.
    pub fn set_transaction_id(&mut self, transaction_id: impl Into<String>) {
        self.transaction_id = Some(transaction_id.into());
    }

    /// The delivery order ID, present once logistics accepted the order.
    pub fn delivery_id(&self) -> Option<&str> {
        self.delivery_id.as_deref()
    }

    /// Records the delivery order ID issued by the logistics provider.
    pub fn set_delivery_id(&mut self, delivery_id: impl Into<String>) {
        self.delivery_id = Some(delivery_id.into());
    }

    /// Appends a domain event raised during this workflow.
    pub fn record_event(&mut self, event: DomainEvent) {
        self.pending_events.push(event);
    }

    /// Events raised so far, in the order they were recorded.
    pub fn pending_events(&self) -> &[DomainEvent] {
        &self.pending_events
    }

    /// Takes the recorded events, leaving the context empty.
    pub fn drain_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.pending_events)
    }
}
