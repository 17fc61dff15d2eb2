//! Per-customer spending read model.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use domain::{CustomerId, DomainEvent, DomainEventKind, DomainEventPayload, Money};
use event_bus::{EventBus, EventHandler, HandlerError, HandlerId};

/// Accumulated spending figures for one customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerSpending {
    /// Sum of all paid order totals.
    pub total_spent: Money,
    /// Reward points, one per whole dollar spent.
    pub reward_points: u64,
    /// Number of paid orders.
    pub paid_orders: u64,
    /// Number of cancelled orders.
    pub cancelled_orders: u64,
}

impl Default for CustomerSpending {
    fn default() -> Self {
        Self {
            total_spent: Money::zero(),
            reward_points: 0,
            paid_orders: 0,
            cancelled_orders: 0,
        }
    }
}

/// Maintains [`CustomerSpending`] figures from OrderPaid and OrderCancelled
/// events. Clones share the same figures, so the wiring code can hand one
/// handle to the bus and keep another for queries.
#[derive(Debug, Clone, Default)]
pub struct CustomerSpendingHandler {
    spending: Arc<RwLock<HashMap<CustomerId, CustomerSpending>>>,
}

impl CustomerSpendingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes this handler to the event kinds it projects.
    pub fn attach(&self, bus: &EventBus<DomainEvent>) -> Vec<HandlerId> {
        [DomainEventKind::OrderPaid, DomainEventKind::OrderCancelled]
            .into_iter()
            .map(|kind| bus.subscribe(kind, Arc::new(self.clone())))
            .collect()
    }

    /// Spending figures for one customer, if any order of theirs finished.
    pub fn spending_for(&self, customer_id: &CustomerId) -> Option<CustomerSpending> {
        self.spending.read().unwrap().get(customer_id).cloned()
    }

    /// Number of customers with recorded figures.
    pub fn customer_count(&self) -> usize {
        self.spending.read().unwrap().len()
    }

    /// Customers ordered by total spent, highest first.
    pub fn top_spenders(&self, limit: usize) -> Vec<(CustomerId, CustomerSpending)> {
        let mut all: Vec<_> = self
            .spending
            .read()
            .unwrap()
            .iter()
            .map(|(id, s)| (id.clone(), s.clone()))
            .collect();
        all.sort_by(|a, b| b.1.total_spent.cmp(&a.1.total_spent));
        all.truncate(limit);
        all
    }

    fn record_paid(&self, customer_id: &CustomerId, total: Money) {
        let mut spending = self.spending.write().unwrap();
        let entry = spending.entry(customer_id.clone()).or_default();
        entry.total_spent += total;
        entry.reward_points += total.dollars() as u64;
        entry.paid_orders += 1;
    }

    fn record_cancelled(&self, customer_id: &CustomerId) {
        let mut spending = self.spending.write().unwrap();
        spending.entry(customer_id.clone()).or_default().cancelled_orders += 1;
    }
}

impl EventHandler<DomainEvent> for CustomerSpendingHandler {
    fn name(&self) -> &'static str {
        "customer_spending"
    }

    fn handle(&self, event: &DomainEvent) -> Result<(), HandlerError> {
        match &event.payload {
            DomainEventPayload::OrderPaid(data) => {
                self.record_paid(&data.customer_id, data.total_amount);
                tracing::debug!(customer_id = %data.customer_id, total = %data.total_amount, "recorded paid order");
            }
            DomainEventPayload::OrderCancelled(data) => {
                self.record_cancelled(&data.customer_id);
                tracing::debug!(customer_id = %data.customer_id, "recorded cancelled order");
            }
            // Not subscribed to anything else; ignore rather than error so a
            // broader subscription stays harmless.
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::OrderId;

    fn paid(customer: &str, cents: i64) -> DomainEvent {
        DomainEvent::order_paid(
            OrderId::new(),
            CustomerId::new(customer),
            Money::from_cents(cents),
        )
    }

    fn cancelled(customer: &str) -> DomainEvent {
        DomainEvent::order_cancelled(OrderId::new(), CustomerId::new(customer), "changed my mind")
    }

    #[test]
    fn test_paid_orders_accumulate_spending_and_points() {
        let handler = CustomerSpendingHandler::new();

        handler.handle(&paid("cust-1", 2550)).unwrap();
        handler.handle(&paid("cust-1", 1000)).unwrap();

        let spending = handler.spending_for(&CustomerId::new("cust-1")).unwrap();
        assert_eq!(spending.total_spent, Money::from_cents(3550));
        assert_eq!(spending.reward_points, 35);
        assert_eq!(spending.paid_orders, 2);
    }

    #[test]
    fn test_cancellations_are_counted_separately() {
        let handler = CustomerSpendingHandler::new();

        handler.handle(&paid("cust-1", 1000)).unwrap();
        handler.handle(&cancelled("cust-1")).unwrap();
        handler.handle(&cancelled("cust-2")).unwrap();

        let first = handler.spending_for(&CustomerId::new("cust-1")).unwrap();
        assert_eq!(first.cancelled_orders, 1);
        assert_eq!(first.total_spent, Money::from_cents(1000));

        let second = handler.spending_for(&CustomerId::new("cust-2")).unwrap();
        assert_eq!(second.cancelled_orders, 1);
        assert_eq!(second.total_spent, Money::zero());
        assert_eq!(handler.customer_count(), 2);
    }

    #[test]
    fn test_unrelated_events_are_ignored() {
        let handler = CustomerSpendingHandler::new();
        let event = DomainEvent::order_created(OrderId::new(), CustomerId::new("cust-1"));

        handler.handle(&event).unwrap();

        assert_eq!(handler.customer_count(), 0);
    }

    #[test]
    fn test_top_spenders_sorts_by_total() {
        let handler = CustomerSpendingHandler::new();
        handler.handle(&paid("low", 100)).unwrap();
        handler.handle(&paid("high", 10_000)).unwrap();
        handler.handle(&paid("mid", 5_000)).unwrap();

        let top = handler.top_spenders(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].0, CustomerId::new("high"));
        assert_eq!(top[1].0, CustomerId::new("mid"));
    }

    #[test]
    fn test_attach_subscribes_to_both_kinds() {
        let bus = EventBus::new();
        let handler = CustomerSpendingHandler::new();

        let ids = handler.attach(&bus);

        assert_eq!(ids.len(), 2);
        assert_eq!(bus.handler_count(DomainEventKind::OrderPaid), 1);
        assert_eq!(bus.handler_count(DomainEventKind::OrderCancelled), 1);

        bus.publish(&paid("cust-1", 1200));
        let spending = handler.spending_for(&CustomerId::new("cust-1")).unwrap();
        assert_eq!(spending.reward_points, 12);
    }
}
