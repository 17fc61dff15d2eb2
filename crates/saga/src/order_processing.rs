//! The order-processing workflow.
//!
//! Charges the customer, arranges the delivery, and marks the order paid,
//! in that order. If any step fails the completed steps are compensated
//! and the order is cancelled, so an order never ends up charged but
//! unshipped or shipped but unpaid.

use std::sync::Arc;

use async_trait::async_trait;
use common::OrderId;
use domain::{DomainEvent, OrderState, OrderValidator, Payment, PaymentMethod};
use event_bus::EventPublisher;
use storage::{OrderRepository, PaymentRepository};

use crate::context::SagaContext;
use crate::error::SagaError;
use crate::ports::{LogisticsService, PaymentGateway};
use crate::runner::{SagaConfig, SagaDefinition, SagaRunner, SagaStep};

pub const ORDER_PROCESSING_SAGA: &str = "order_processing";
pub const STEP_CHARGE_PAYMENT: &str = "charge_payment";
pub const STEP_ARRANGE_LOGISTICS: &str = "arrange_logistics";
pub const STEP_FINALIZE_ORDER: &str = "finalize_order";

/// Charges the order total through the payment gateway.
///
/// Records a payment attempt in the context either way: completed with the
/// gateway's transaction ID, or failed with the decline reason. The
/// compensation refunds the charge using the recorded transaction ID.
pub struct ChargePaymentStep<G> {
    gateway: Arc<G>,
    method: PaymentMethod,
}

impl<G> ChargePaymentStep<G> {
    pub fn new(gateway: Arc<G>, method: PaymentMethod) -> Self {
        Self { gateway, method }
    }
}

#[async_trait]
impl<G: PaymentGateway> SagaStep<SagaContext> for ChargePaymentStep<G> {
    fn name(&self) -> &'static str {
        STEP_CHARGE_PAYMENT
    }

    async fn execute(&self, ctx: &mut SagaContext) -> Result<(), SagaError> {
        let order_id = ctx.order().id();
        let amount = ctx.order().total_amount();

        let (mut payment, requested) = Payment::request(order_id, amount)?;
        ctx.record_event(requested);

        match self.gateway.charge(order_id, amount, self.method).await {
            Ok(receipt) => {
                payment.mark_completed()?;
                ctx.set_payment(payment);
                ctx.set_transaction_id(receipt.transaction_id);
                Ok(())
            }
            Err(cause) => {
                let failed = payment.mark_failed(cause.to_string())?;
                ctx.record_event(failed);
                ctx.set_payment(payment);
                Err(cause)
            }
        }
    }

    async fn compensate(&self, ctx: &mut SagaContext) -> Result<(), SagaError> {
        // Only a successful charge leaves a transaction ID behind.
        let Some(transaction_id) = ctx.transaction_id() else {
            return Ok(());
        };
        self.gateway
            .refund(transaction_id, ctx.order().total_amount())
            .await
    }
}

/// Registers the delivery order with the logistics provider.
///
/// No `compensate` override: the provider offers no cancellation call, so
/// there is nothing to undo from here.
pub struct ArrangeLogisticsStep<L> {
    logistics: Arc<L>,
}

impl<L> ArrangeLogisticsStep<L> {
    pub fn new(logistics: Arc<L>) -> Self {
        Self { logistics }
    }
}

#[async_trait]
impl<L: LogisticsService> SagaStep<SagaContext> for ArrangeLogisticsStep<L> {
    fn name(&self) -> &'static str {
        STEP_ARRANGE_LOGISTICS
    }

    async fn execute(&self, ctx: &mut SagaContext) -> Result<(), SagaError> {
        let ticket = self
            .logistics
            .create_delivery_order(ctx.order().id())
            .await?;
        ctx.set_delivery_id(ticket.delivery_id);
        Ok(())
    }
}

/// Transitions the order to Paid once charge and delivery are in place.
pub struct FinalizeOrderStep;

#[async_trait]
impl SagaStep<SagaContext> for FinalizeOrderStep {
    fn name(&self) -> &'static str {
        STEP_FINALIZE_ORDER
    }

    async fn execute(&self, ctx: &mut SagaContext) -> Result<(), SagaError> {
        let event = ctx.order_mut().mark_paid()?;
        ctx.record_event(event);
        Ok(())
    }
}

/// Orchestrates the order-processing saga end to end.
///
/// Loads and validates the order, runs the saga, persists the resulting
/// order and payment states, and publishes the raised domain events after
/// persistence. On saga failure the order is cancelled unconditionally;
/// the original step failure is what the caller gets back.
pub struct OrderProcessingService<G, L, OR, PR> {
    gateway: Arc<G>,
    logistics: Arc<L>,
    orders: OR,
    payments: PR,
    validator: OrderValidator,
    publisher: EventPublisher<DomainEvent>,
    runner: SagaRunner,
}

impl<G, L, OR, PR> OrderProcessingService<G, L, OR, PR>
where
    G: PaymentGateway + 'static,
    L: LogisticsService + 'static,
    OR: OrderRepository,
    PR: PaymentRepository,
{
    pub fn new(
        gateway: Arc<G>,
        logistics: Arc<L>,
        orders: OR,
        payments: PR,
        validator: OrderValidator,
        publisher: EventPublisher<DomainEvent>,
        config: SagaConfig,
    ) -> Self {
        Self {
            gateway,
            logistics,
            orders,
            payments,
            validator,
            publisher,
            runner: SagaRunner::new(config),
        }
    }

    fn definition(&self) -> SagaDefinition<SagaContext> {
        SagaDefinition::new(ORDER_PROCESSING_SAGA)
            .step(Arc::new(ChargePaymentStep::new(
                Arc::clone(&self.gateway),
                PaymentMethod::CreditCard,
            )))
            .step(Arc::new(ArrangeLogisticsStep::new(Arc::clone(
                &self.logistics,
            ))))
            .step(Arc::new(FinalizeOrderStep))
    }

    /// Processes a submitted order.
    ///
    /// Returns the final workflow context on success. Re-running the
    /// workflow for an order that is already Paid or Cancelled is rejected
    /// up front, before any side effect.
    #[tracing::instrument(skip(self))]
    pub async fn process_order(&self, order_id: OrderId) -> Result<SagaContext, SagaError> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or(SagaError::OrderNotFound(order_id))?;

        if order.state() != OrderState::Submitted {
            return Err(SagaError::OrderNotReady(format!(
                "order {} is {}, expected Submitted",
                order_id,
                order.state()
            )));
        }
        self.validator.validate(&order)?;

        let definition = self.definition();
        let mut ctx = SagaContext::new(order);
        let report = self.runner.run(&definition, &mut ctx).await;

        match report.into_error() {
            None => {
                self.persist(&mut ctx).await?;
                tracing::info!(%order_id, "order processed");
                Ok(ctx)
            }
            Some(failure) => {
                // Compensation already ran inside the runner; all that is
                // left is to put the order itself in its terminal state.
                match ctx.order_mut().cancel(failure.to_string()) {
                    Ok(cancelled) => ctx.record_event(cancelled),
                    Err(error) => {
                        tracing::error!(%order_id, %error, "could not cancel failed order");
                    }
                }
                self.persist(&mut ctx).await?;
                tracing::warn!(%order_id, error = %failure, "order processing failed");
                Err(failure)
            }
        }
    }

    /// Persists the order and payment, then publishes the raised events.
    /// Publishing happens strictly after persistence so handlers only
    /// observe state that is already stored.
    async fn persist(&self, ctx: &mut SagaContext) -> Result<(), SagaError> {
        self.orders.save(ctx.order()).await?;
        if let Some(payment) = ctx.payment() {
            self.payments.save(payment).await?;
        }
        let events = ctx.drain_events();
        self.publisher.publish_all(events.iter());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Money, Order, OrderItem, OrderLimits, PaymentState};
    use storage::{InMemoryOrderRepository, InMemoryPaymentRepository};

    use crate::ports::{InMemoryLogisticsService, InMemoryPaymentGateway};

    struct Fixture {
        gateway: Arc<InMemoryPaymentGateway>,
        logistics: Arc<InMemoryLogisticsService>,
        orders: InMemoryOrderRepository,
        payments: InMemoryPaymentRepository,
        service: OrderProcessingService<
            InMemoryPaymentGateway,
            InMemoryLogisticsService,
            InMemoryOrderRepository,
            InMemoryPaymentRepository,
        >,
    }

    fn fixture() -> Fixture {
        let gateway = Arc::new(InMemoryPaymentGateway::new());
        let logistics = Arc::new(InMemoryLogisticsService::new());
        let orders = InMemoryOrderRepository::new();
        let payments = InMemoryPaymentRepository::new();
        let service = OrderProcessingService::new(
            Arc::clone(&gateway),
            Arc::clone(&logistics),
            orders.clone(),
            payments.clone(),
            OrderValidator::new(OrderLimits::default()),
            EventPublisher::unbound(),
            SagaConfig { step_timeout: None },
        );
        Fixture {
            gateway,
            logistics,
            orders,
            payments,
            service,
        }
    }

    async fn submitted_order(orders: &InMemoryOrderRepository) -> OrderId {
        let (mut order, _) = Order::create("cust-1", "1 Main St").unwrap();
        order
            .add_item(OrderItem::new("SKU-1", "Widget", 2, Money::from_cents(1500)))
            .unwrap();
        order.submit().unwrap();
        orders.save(&order).await.unwrap();
        order.id()
    }

    #[tokio::test]
    async fn test_happy_path_pays_the_order() {
        let fx = fixture();
        let order_id = submitted_order(&fx.orders).await;

        let ctx = fx.service.process_order(order_id).await.unwrap();

        assert!(ctx.transaction_id().is_some());
        assert!(ctx.delivery_id().is_some());

        let order = fx.orders.find_by_id(order_id).await.unwrap().unwrap();
        assert_eq!(order.state(), OrderState::Paid);

        let attempts = fx.payments.find_by_order_id(order_id).await.unwrap();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].state(), PaymentState::Completed);
        assert_eq!(attempts[0].amount(), Money::from_cents(3000));

        assert_eq!(fx.gateway.charge_count(), 1);
        assert!(fx.logistics.has_delivery_for(order_id));
    }

    #[tokio::test]
    async fn test_declined_payment_cancels_the_order() {
        let fx = fixture();
        let order_id = submitted_order(&fx.orders).await;
        fx.gateway.set_fail_on_charge(true);

        let error = fx.service.process_order(order_id).await.unwrap_err();
        assert!(matches!(
            error,
            SagaError::StepFailed {
                step: STEP_CHARGE_PAYMENT,
                ..
            }
        ));

        let order = fx.orders.find_by_id(order_id).await.unwrap().unwrap();
        assert_eq!(order.state(), OrderState::Cancelled);

        // The failed attempt is persisted with its reason; nothing was
        // charged, so nothing was refunded.
        let attempts = fx.payments.find_by_order_id(order_id).await.unwrap();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].state(), PaymentState::Failed);
        assert!(attempts[0].failure_reason().unwrap().contains("declined"));
        assert_eq!(fx.gateway.refund_count(), 0);
        assert_eq!(fx.logistics.delivery_count(), 0);
    }

    #[tokio::test]
    async fn test_logistics_failure_refunds_and_cancels() {
        let fx = fixture();
        let order_id = submitted_order(&fx.orders).await;
        fx.logistics.set_fail_on_create(true);

        let error = fx.service.process_order(order_id).await.unwrap_err();
        assert!(matches!(
            error,
            SagaError::StepFailed {
                step: STEP_ARRANGE_LOGISTICS,
                ..
            }
        ));

        let order = fx.orders.find_by_id(order_id).await.unwrap().unwrap();
        assert_eq!(order.state(), OrderState::Cancelled);

        // The charge was compensated with a full refund.
        assert_eq!(fx.gateway.refund_count(), 1);
        assert_eq!(fx.gateway.charge_count(), 0);
        assert_eq!(fx.gateway.refunds()[0].1, Money::from_cents(3000));
    }

    #[tokio::test]
    async fn test_unknown_order_is_rejected() {
        let fx = fixture();

        let error = fx.service.process_order(OrderId::new()).await.unwrap_err();

        assert!(matches!(error, SagaError::OrderNotFound(_)));
        assert_eq!(fx.gateway.charge_count(), 0);
    }

    #[tokio::test]
    async fn test_unsubmitted_order_is_rejected() {
        let fx = fixture();
        let (order, _) = Order::create("cust-1", "1 Main St").unwrap();
        fx.orders.save(&order).await.unwrap();

        let error = fx.service.process_order(order.id()).await.unwrap_err();

        assert!(matches!(error, SagaError::OrderNotReady(_)));
        assert_eq!(fx.gateway.charge_count(), 0);
    }

    #[tokio::test]
    async fn test_paid_order_is_not_processed_twice() {
        let fx = fixture();
        let order_id = submitted_order(&fx.orders).await;

        fx.service.process_order(order_id).await.unwrap();
        let error = fx.service.process_order(order_id).await.unwrap_err();

        assert!(matches!(error, SagaError::OrderNotReady(_)));
        assert_eq!(fx.gateway.charge_count(), 1);
        assert_eq!(fx.logistics.delivery_count(), 1);
    }

    #[tokio::test]
    async fn test_order_over_limits_is_rejected_before_any_side_effect() {
        let gateway = Arc::new(InMemoryPaymentGateway::new());
        let logistics = Arc::new(InMemoryLogisticsService::new());
        let orders = InMemoryOrderRepository::new();
        let service = OrderProcessingService::new(
            Arc::clone(&gateway),
            Arc::clone(&logistics),
            orders.clone(),
            InMemoryPaymentRepository::new(),
            OrderValidator::new(OrderLimits {
                max_items: 1,
                max_total: Money::from_cents(100_000),
            }),
            EventPublisher::unbound(),
            SagaConfig { step_timeout: None },
        );

        let order_id = submitted_order(&orders).await;
        let error = service.process_order(order_id).await.unwrap_err();

        assert!(matches!(error, SagaError::Validation(_)));
        assert_eq!(gateway.charge_count(), 0);
        assert_eq!(logistics.delivery_count(), 0);
        // The order is untouched, not cancelled; it can be corrected and
        // resubmitted for processing.
        let order = orders.find_by_id(order_id).await.unwrap().unwrap();
        assert_eq!(order.state(), OrderState::Submitted);
    }
}
