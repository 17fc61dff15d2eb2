//! Demo entry point: wires the bus, repositories, ports, and the
//! order-processing service, then walks one order through a successful run
//! and another through a declined payment.

mod config;

use std::sync::Arc;

use domain::{CustomerId, DomainEvent, Money, Order, OrderItem, OrderValidator};
use event_bus::{EventBus, EventPublisher};
use handlers::CustomerSpendingHandler;
use saga::{InMemoryLogisticsService, InMemoryPaymentGateway, OrderProcessingService};
use storage::{InMemoryOrderRepository, InMemoryPaymentRepository, OrderRepository};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Config;

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let bus: Arc<EventBus<DomainEvent>> = Arc::new(EventBus::new());
    let spending = CustomerSpendingHandler::new();
    spending.attach(&bus);
    bus.subscribe_fn(domain::DomainEventKind::OrderPaid, |event: &DomainEvent| {
        tracing::info!(event = event.event_type(), "domain event");
        Ok(())
    });

    let gateway = Arc::new(InMemoryPaymentGateway::new());
    let logistics = Arc::new(InMemoryLogisticsService::new());
    let orders = InMemoryOrderRepository::new();
    let payments = InMemoryPaymentRepository::new();

    let service = OrderProcessingService::new(
        Arc::clone(&gateway),
        Arc::clone(&logistics),
        orders.clone(),
        payments.clone(),
        OrderValidator::new(config.order_limits()),
        EventPublisher::bound(Arc::clone(&bus)),
        config.saga_config(),
    );

    // A successful run: charged, delivery arranged, order paid.
    let first = submit_demo_order(&orders, "alice", 2, Money::from_cents(2499)).await;
    match service.process_order(first).await {
        Ok(ctx) => tracing::info!(
            order_id = %first,
            transaction_id = ctx.transaction_id().unwrap_or("-"),
            delivery_id = ctx.delivery_id().unwrap_or("-"),
            "order processed"
        ),
        Err(error) => tracing::error!(order_id = %first, %error, "order processing failed"),
    }

    // A declined payment: the saga compensates and cancels the order.
    gateway.set_fail_on_charge(true);
    let second = submit_demo_order(&orders, "bob", 1, Money::from_cents(9900)).await;
    if let Err(error) = service.process_order(second).await {
        tracing::warn!(order_id = %second, %error, "order cancelled");
    }
    gateway.set_fail_on_charge(false);

    for (customer, figures) in spending.top_spenders(10) {
        tracing::info!(
            customer = %customer,
            total_spent = %figures.total_spent,
            reward_points = figures.reward_points,
            cancelled = figures.cancelled_orders,
            "customer spending"
        );
    }
}

async fn submit_demo_order(
    orders: &InMemoryOrderRepository,
    customer: &str,
    quantity: u32,
    unit_price: Money,
) -> common::OrderId {
    let (mut order, _) = Order::create(CustomerId::new(customer), "42 Demo Street")
        .expect("demo order is valid");
    order
        .add_item(OrderItem::new("SKU-DEMO", "Demo Widget", quantity, unit_price))
        .expect("demo item is valid");
    order.submit().expect("demo order has items");
    orders.save(&order).await.expect("in-memory save");
    order.id()
}
