use serde::{Deserialize, Serialize};

use super::env;
use crate::error::Result;

/// Freshness TTLs, §6 and §4.4/§4.5 staleness checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FreshnessConfig {
    pub price_staleness_ttl_secs: u64,
    pub game_state_staleness_ttl_secs: u64,
}

impl Default for FreshnessConfig {
    fn default() -> Self {
        Self {
            price_staleness_ttl_secs: 10,
            game_state_staleness_ttl_secs: 30,
        }
    }
}

impl FreshnessConfig {
    pub fn from_env() -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            price_staleness_ttl_secs: env::optional("PRICE_STALENESS_TTL", d.price_staleness_ttl_secs)?,
            game_state_staleness_ttl_secs: env::optional(
                "GAME_STATE_STALENESS_TTL",
                d.game_state_staleness_ttl_secs,
            )?,
        })
    }
}

/// Polling/debounce cadence, §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub poll_interval_secs: u64,
    pub signal_debounce_secs: u64,
    pub exit_check_interval_secs: u64,
    pub min_hold_seconds: u64,
    pub take_profit_pct: f64,
    pub default_stop_loss_pct: f64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            signal_debounce_secs: 15,
            exit_check_interval_secs: 5,
            min_hold_seconds: 30,
            take_profit_pct: 0.08,
            default_stop_loss_pct: 0.05,
        }
    }
}

impl PollingConfig {
    pub fn from_env() -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            poll_interval_secs: env::optional("POLL_INTERVAL", d.poll_interval_secs)?,
            signal_debounce_secs: env::optional("SIGNAL_DEBOUNCE_SECS", d.signal_debounce_secs)?,
            exit_check_interval_secs: env::optional(
                "EXIT_CHECK_INTERVAL_SECS",
                d.exit_check_interval_secs,
            )?,
            min_hold_seconds: env::optional("MIN_HOLD_SECONDS", d.min_hold_seconds)?,
            take_profit_pct: env::optional("TAKE_PROFIT_PCT", d.take_profit_pct)?,
            default_stop_loss_pct: env::optional("DEFAULT_STOP_LOSS_PCT", d.default_stop_loss_pct)?,
        })
    }
}

/// Heartbeat/supervision timing, §6 and §4.3 assignment protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartbeatConfig {
    pub interval_secs: u64,
    pub ttl_secs: u64,
    pub miss_threshold: u32,
    pub supervisor_enabled: bool,
    pub max_restart_attempts: u32,
    pub restart_backoff_secs: u64,
    pub restart_cooldown_secs: u64,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval_secs: 10,
            ttl_secs: 35,
            miss_threshold: 3,
            supervisor_enabled: true,
            max_restart_attempts: 5,
            restart_backoff_secs: 10,
            restart_cooldown_secs: 300,
        }
    }
}

impl HeartbeatConfig {
    pub fn from_env() -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            interval_secs: env::optional("HEARTBEAT_INTERVAL_SECS", d.interval_secs)?,
            ttl_secs: env::optional("HEARTBEAT_TTL_SECS", d.ttl_secs)?,
            miss_threshold: env::optional("HEARTBEAT_MISS_THRESHOLD", d.miss_threshold)?,
            supervisor_enabled: env::optional_bool("SUPERVISOR_ENABLED", d.supervisor_enabled)?,
            max_restart_attempts: env::optional("MAX_RESTART_ATTEMPTS", d.max_restart_attempts)?,
            restart_backoff_secs: env::optional("RESTART_BACKOFF_SECS", d.restart_backoff_secs)?,
            restart_cooldown_secs: env::optional("RESTART_COOLDOWN_SECS", d.restart_cooldown_secs)?,
        })
    }
}
