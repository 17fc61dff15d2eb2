//! Pre-submission order validation against configured limits.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Money, Order};

/// Configured ceilings applied before an order enters the saga.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLimits {
    /// Maximum total item quantity across all lines.
    pub max_items: u32,

    /// Maximum order total.
    pub max_total: Money,
}

impl Default for OrderLimits {
    fn default() -> Self {
        Self {
            max_items: 100,
            max_total: Money::from_dollars(10_000),
        }
    }
}

/// A single violated validation rule.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleViolation {
    /// The order carries more items than allowed.
    #[error("too many items: {count} (limit {max})")]
    TooManyItems { count: u32, max: u32 },

    /// The order total exceeds the configured ceiling.
    #[error("total {total} exceeds limit {max}")]
    TotalExceedsLimit { total: Money, max: Money },

    /// The order has no usable customer id.
    #[error("customer id is missing")]
    CustomerIdMissing,
}

/// All rules an order violated, reported together as one failure.
///
/// Validation does not short-circuit: the report lists every violated
/// rule so the caller can surface them all at once.
#[derive(Debug, Clone, Error)]
#[error("order validation failed: {}", self.describe())]
pub struct ValidationReport {
    violations: Vec<RuleViolation>,
}

impl ValidationReport {
    /// Returns the individual violations.
    pub fn violations(&self) -> &[RuleViolation] {
        &self.violations
    }

    fn describe(&self) -> String {
        self.violations
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Validates orders against [`OrderLimits`] before saga execution.
#[derive(Debug, Clone, Default)]
pub struct OrderValidator {
    limits: OrderLimits,
}

impl OrderValidator {
    /// Creates a validator with the given limits.
    pub fn new(limits: OrderLimits) -> Self {
        Self { limits }
    }

    /// Returns the configured limits.
    pub fn limits(&self) -> &OrderLimits {
        &self.limits
    }

    /// Checks every rule and reports all violations together.
    pub fn validate(&self, order: &Order) -> Result<(), ValidationReport> {
        let mut violations = Vec::new();

        let count: u32 = order.items().iter().map(|item| item.quantity).sum();
        if count > self.limits.max_items {
            violations.push(RuleViolation::TooManyItems {
                count,
                max: self.limits.max_items,
            });
        }

        if order.total_amount() > self.limits.max_total {
            violations.push(RuleViolation::TotalExceedsLimit {
                total: order.total_amount(),
                max: self.limits.max_total,
            });
        }

        if order.customer_id().is_empty() {
            violations.push(RuleViolation::CustomerIdMissing);
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationReport { violations })
        }
    }
}
