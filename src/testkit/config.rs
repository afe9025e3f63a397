//! Canonical test configurations.
//!
//! Single source of truth for the [`Config`] used across tests, so each
//! test module doesn't define its own slightly-different defaults.

use crate::config::{
    Config, Credentials, EdgeConfig, ExecutionConfig, FreshnessConfig, HeartbeatConfig,
    LiquidityConfig, LogFormat, LoggingConfig, PollingConfig, RiskConfig,
};

/// A fully-defaulted config with fast polling/hold timings and paper
/// trading on, suitable for exercising the filter/sizing/exit pipelines
/// without waiting on real-world cadences.
#[must_use]
pub fn fast() -> Config {
    Config {
        edge: EdgeConfig::default(),
        risk: RiskConfig::default(),
        liquidity: LiquidityConfig::default(),
        freshness: FreshnessConfig::default(),
        polling: PollingConfig {
            poll_interval_secs: 1,
            signal_debounce_secs: 1,
            exit_check_interval_secs: 1,
            min_hold_seconds: 0,
            take_profit_pct: 0.08,
            default_stop_loss_pct: 0.05,
        },
        heartbeat: HeartbeatConfig { interval_secs: 1, ttl_secs: 3, miss_threshold: 2, ..HeartbeatConfig::default() },
        execution: ExecutionConfig::default(),
        logging: LoggingConfig { filter: "warn".to_string(), format: LogFormat::Pretty },
        credentials: Credentials::default(),
        paper_trading: true,
        database_url: "postgres://localhost/test".to_string(),
        redis_url: "redis://localhost".to_string(),
    }
}
