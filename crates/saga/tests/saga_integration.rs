//! End-to-end tests of the order-processing saga with a live event bus.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use common::OrderId;
use domain::{
    DomainEvent, DomainEventKind, Money, Order, OrderItem, OrderLimits, OrderState,
    OrderValidator, PaymentMethod, PaymentState,
};
use event_bus::{EventBus, EventPublisher};
use saga::{
    ChargeReceipt, InMemoryLogisticsService, InMemoryPaymentGateway, OrderProcessingService,
    PaymentGateway, SagaConfig, SagaError,
};
use storage::{
    InMemoryOrderRepository, InMemoryPaymentRepository, OrderRepository, PaymentRepository,
};

/// Records every event kind delivered through the bus, in delivery order.
fn record_kinds(bus: &EventBus<DomainEvent>) -> Arc<Mutex<Vec<DomainEventKind>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    for kind in [
        DomainEventKind::OrderCreated,
        DomainEventKind::OrderItemAdded,
        DomainEventKind::OrderSubmitted,
        DomainEventKind::OrderPaid,
        DomainEventKind::OrderCancelled,
        DomainEventKind::PaymentRequested,
        DomainEventKind::PaymentFailed,
    ] {
        let seen = Arc::clone(&seen);
        bus.subscribe_fn(kind, move |event: &DomainEvent| {
            seen.lock().unwrap().push(event.kind());
            Ok(())
        });
    }
    seen
}

async fn submitted_order(orders: &InMemoryOrderRepository) -> OrderId {
    let (mut order, _) = Order::create("cust-42", "7 Harbor Way").unwrap();
    order
        .add_item(OrderItem::new("SKU-9", "Lamp", 1, Money::from_cents(4500)))
        .unwrap();
    order.submit().unwrap();
    orders.save(&order).await.unwrap();
    order.id()
}

fn service<G: PaymentGateway + 'static>(
    gateway: Arc<G>,
    logistics: Arc<InMemoryLogisticsService>,
    orders: InMemoryOrderRepository,
    payments: InMemoryPaymentRepository,
    publisher: EventPublisher<DomainEvent>,
    config: SagaConfig,
) -> OrderProcessingService<G, InMemoryLogisticsService, InMemoryOrderRepository, InMemoryPaymentRepository>
{
    OrderProcessingService::new(
        gateway,
        logistics,
        orders,
        payments,
        OrderValidator::new(OrderLimits::default()),
        publisher,
        config,
    )
}

#[tokio::test]
async fn test_successful_run_publishes_payment_and_paid_events() {
    let bus = Arc::new(EventBus::new());
    let seen = record_kinds(&bus);

    let gateway = Arc::new(InMemoryPaymentGateway::new());
    let logistics = Arc::new(InMemoryLogisticsService::new());
    let orders = InMemoryOrderRepository::new();
    let service = service(
        Arc::clone(&gateway),
        Arc::clone(&logistics),
        orders.clone(),
        InMemoryPaymentRepository::new(),
        EventPublisher::bound(Arc::clone(&bus)),
        SagaConfig::default(),
    );

    let order_id = submitted_order(&orders).await;
    let ctx = service.process_order(order_id).await.unwrap();

    assert_eq!(ctx.transaction_id(), Some("TXN-0001"));
    assert_eq!(ctx.delivery_id(), Some("DLV-0001"));
    assert_eq!(
        *seen.lock().unwrap(),
        [DomainEventKind::PaymentRequested, DomainEventKind::OrderPaid]
    );
}

#[tokio::test]
async fn test_declined_payment_publishes_failure_and_cancellation() {
    let bus = Arc::new(EventBus::new());
    let seen = record_kinds(&bus);

    let gateway = Arc::new(InMemoryPaymentGateway::new());
    gateway.set_fail_on_charge(true);
    let logistics = Arc::new(InMemoryLogisticsService::new());
    let orders = InMemoryOrderRepository::new();
    let payments = InMemoryPaymentRepository::new();
    let service = service(
        Arc::clone(&gateway),
        Arc::clone(&logistics),
        orders.clone(),
        payments.clone(),
        EventPublisher::bound(Arc::clone(&bus)),
        SagaConfig::default(),
    );

    let order_id = submitted_order(&orders).await;
    let error = service.process_order(order_id).await.unwrap_err();
    assert!(matches!(error, SagaError::StepFailed { .. }));

    assert_eq!(
        *seen.lock().unwrap(),
        [
            DomainEventKind::PaymentRequested,
            DomainEventKind::PaymentFailed,
            DomainEventKind::OrderCancelled,
        ]
    );

    let order = orders.find_by_id(order_id).await.unwrap().unwrap();
    assert_eq!(order.state(), OrderState::Cancelled);
    let attempts = payments.find_by_order_id(order_id).await.unwrap();
    assert_eq!(attempts[0].state(), PaymentState::Failed);
}

#[tokio::test]
async fn test_logistics_failure_refunds_then_cancels() {
    let bus = Arc::new(EventBus::new());
    let seen = record_kinds(&bus);

    let gateway = Arc::new(InMemoryPaymentGateway::new());
    let logistics = Arc::new(InMemoryLogisticsService::new());
    logistics.set_fail_on_create(true);
    let orders = InMemoryOrderRepository::new();
    let payments = InMemoryPaymentRepository::new();
    let service = service(
        Arc::clone(&gateway),
        Arc::clone(&logistics),
        orders.clone(),
        payments.clone(),
        EventPublisher::bound(Arc::clone(&bus)),
        SagaConfig::default(),
    );

    let order_id = submitted_order(&orders).await;
    service.process_order(order_id).await.unwrap_err();

    // The charge is refunded in full and the order cancelled. The payment
    // attempt itself completed at the gateway, so no PaymentFailed event.
    assert_eq!(gateway.refund_count(), 1);
    assert_eq!(gateway.refunds()[0].1, Money::from_cents(4500));
    assert_eq!(
        *seen.lock().unwrap(),
        [
            DomainEventKind::PaymentRequested,
            DomainEventKind::OrderCancelled,
        ]
    );

    let order = orders.find_by_id(order_id).await.unwrap().unwrap();
    assert_eq!(order.state(), OrderState::Cancelled);
    let attempts = payments.find_by_order_id(order_id).await.unwrap();
    assert_eq!(attempts[0].state(), PaymentState::Completed);
}

/// Gateway that never answers, for exercising the step timeout.
struct StalledGateway;

#[async_trait]
impl PaymentGateway for StalledGateway {
    async fn charge(
        &self,
        _order_id: OrderId,
        _amount: Money,
        _method: PaymentMethod,
    ) -> Result<ChargeReceipt, SagaError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        unreachable!("charge should have been timed out")
    }

    async fn refund(&self, _transaction_id: &str, _amount: Money) -> Result<(), SagaError> {
        Ok(())
    }
}

#[tokio::test]
async fn test_stalled_gateway_times_out_and_cancels_the_order() {
    let gateway = Arc::new(StalledGateway);
    let logistics = Arc::new(InMemoryLogisticsService::new());
    let orders = InMemoryOrderRepository::new();
    let service = service(
        gateway,
        Arc::clone(&logistics),
        orders.clone(),
        InMemoryPaymentRepository::new(),
        EventPublisher::unbound(),
        SagaConfig {
            step_timeout: Some(Duration::from_millis(50)),
        },
    );

    let order_id = submitted_order(&orders).await;
    let error = service.process_order(order_id).await.unwrap_err();

    assert!(matches!(error, SagaError::StepTimedOut { .. }));
    assert_eq!(logistics.delivery_count(), 0);
    let order = orders.find_by_id(order_id).await.unwrap().unwrap();
    assert_eq!(order.state(), OrderState::Cancelled);
}

#[tokio::test]
async fn test_runs_to_completion_without_a_bus() {
    // An unbound publisher drops events instead of failing the workflow.
    let gateway = Arc::new(InMemoryPaymentGateway::new());
    let logistics = Arc::new(InMemoryLogisticsService::new());
    let orders = InMemoryOrderRepository::new();
    let service = service(
        Arc::clone(&gateway),
        logistics,
        orders.clone(),
        InMemoryPaymentRepository::new(),
        EventPublisher::unbound(),
        SagaConfig::default(),
    );

    let order_id = submitted_order(&orders).await;
    service.process_order(order_id).await.unwrap();

    let order = orders.find_by_id(order_id).await.unwrap().unwrap();
    assert_eq!(order.state(), OrderState::Paid);
}
