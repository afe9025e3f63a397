use serde::{Deserialize, Serialize};

use super::env;
use crate::error::Result;

/// Per-venue circuit breaker and rate-limit policy, §4.6.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    pub circuit_failure_threshold: u32,
    pub circuit_half_open_after_secs: u64,
    pub circuit_reset_after_secs: u64,
    pub rate_limit_initial_backoff_secs: u64,
    pub rate_limit_max_attempts: u32,
    pub max_order_notional_dollars: f64,
    pub max_order_contracts: f64,
    pub min_safe_price: f64,
    pub max_safe_price: f64,
    pub kill_switch_enabled: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            circuit_failure_threshold: 5,
            circuit_half_open_after_secs: 60,
            circuit_reset_after_secs: 300,
            rate_limit_initial_backoff_secs: 2,
            rate_limit_max_attempts: 5,
            max_order_notional_dollars: 1000.0,
            max_order_contracts: 1000.0,
            min_safe_price: 0.01,
            max_safe_price: 0.99,
            kill_switch_enabled: false,
        }
    }
}

impl ExecutionConfig {
    pub fn from_env() -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            circuit_failure_threshold: env::optional(
                "CIRCUIT_FAILURE_THRESHOLD",
                d.circuit_failure_threshold,
            )?,
            circuit_half_open_after_secs: env::optional(
                "CIRCUIT_HALF_OPEN_AFTER_SECS",
                d.circuit_half_open_after_secs,
            )?,
            circuit_reset_after_secs: env::optional(
                "CIRCUIT_RESET_AFTER_SECS",
                d.circuit_reset_after_secs,
            )?,
            rate_limit_initial_backoff_secs: env::optional(
                "RATE_LIMIT_INITIAL_BACKOFF_SECS",
                d.rate_limit_initial_backoff_secs,
            )?,
            rate_limit_max_attempts: env::optional(
                "RATE_LIMIT_MAX_ATTEMPTS",
                d.rate_limit_max_attempts,
            )?,
            max_order_notional_dollars: env::optional(
                "MAX_ORDER_NOTIONAL_DOLLARS",
                d.max_order_notional_dollars,
            )?,
            max_order_contracts: env::optional("MAX_ORDER_CONTRACTS", d.max_order_contracts)?,
            min_safe_price: env::optional("MIN_SAFE_PRICE", d.min_safe_price)?,
            max_safe_price: env::optional("MAX_SAFE_PRICE", d.max_safe_price)?,
            kill_switch_enabled: env::optional_bool("KILL_SWITCH", d.kill_switch_enabled)?,
        })
    }
}
