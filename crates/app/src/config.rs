//! Application configuration loaded from environment variables.

use std::time::Duration;

use domain::{Money, OrderLimits};
use saga::SagaConfig;

/// Runtime configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `ORDER_MAX_ITEMS` — per-order item limit (default: `100`)
/// - `ORDER_MAX_TOTAL_CENTS` — per-order total limit (default: `1000000`)
/// - `SAGA_STEP_TIMEOUT_MS` — per-step timeout, `0` disables (default: `30000`)
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub max_items: u32,
    pub max_total_cents: i64,
    pub step_timeout_ms: u64,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            max_items: std::env::var("ORDER_MAX_ITEMS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_items),
            max_total_cents: std::env::var("ORDER_MAX_TOTAL_CENTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_total_cents),
            step_timeout_ms: std::env::var("SAGA_STEP_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.step_timeout_ms),
        }
    }

    /// Validation limits derived from this configuration.
    pub fn order_limits(&self) -> OrderLimits {
        OrderLimits {
            max_items: self.max_items,
            max_total: Money::from_cents(self.max_total_cents),
        }
    }

    /// Saga runner settings derived from this configuration.
    pub fn saga_config(&self) -> SagaConfig {
        SagaConfig {
            step_timeout: match self.step_timeout_ms {
                0 => None,
                ms => Some(Duration::from_millis(ms)),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            max_items: 100,
            max_total_cents: 1_000_000,
            step_timeout_ms: 30_000,
        }
    }
}
