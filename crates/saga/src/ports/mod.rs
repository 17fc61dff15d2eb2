//! Outbound ports of the order-processing workflow.

pub mod logistics;
pub mod payment;

pub use logistics::{DeliveryTicket, InMemoryLogisticsService, LogisticsService};
pub use payment::{ChargeReceipt, InMemoryPaymentGateway, PaymentGateway};
