//! Event handlers that maintain read models off the domain event stream.

pub mod customer_spending;

pub use customer_spending::{CustomerSpending, CustomerSpendingHandler};
