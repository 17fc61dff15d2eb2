//! Saga orchestration for order processing.
//!
//! The [`runner`] module is a generic compensating-transaction engine:
//! workflows are data ([`SagaDefinition`]), not code, and failures flow
//! through `Result` values rather than panics. [`order_processing`] builds
//! the concrete charge/ship/finalize workflow on top of it, talking to the
//! outside world only through the [`ports`].

pub mod context;
pub mod error;
pub mod order_processing;
pub mod ports;
pub mod runner;

pub use context::SagaContext;
pub use error::SagaError;
pub use order_processing::{
    ArrangeLogisticsStep, ChargePaymentStep, FinalizeOrderStep, OrderProcessingService,
    ORDER_PROCESSING_SAGA, STEP_ARRANGE_LOGISTICS, STEP_CHARGE_PAYMENT, STEP_FINALIZE_ORDER,
};
pub use ports::{
    ChargeReceipt, DeliveryTicket, InMemoryLogisticsService, InMemoryPaymentGateway,
    LogisticsService, PaymentGateway,
};
pub use runner::{SagaConfig, SagaDefinition, SagaReport, SagaRunner, SagaState, SagaStep};
