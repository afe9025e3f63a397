use serde::{Deserialize, Serialize};

use super::env;
use crate::domain::Cents;
use crate::error::Result;

/// Risk limits enforced by the signal processor's parallel risk checks, §4.6.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub max_daily_loss: Cents,
    pub max_game_exposure: Cents,
    pub max_sport_exposure: Cents,
    pub win_cooldown_seconds: u64,
    pub loss_cooldown_seconds: u64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_daily_loss: Cents(50_000),
            max_game_exposure: Cents(20_000),
            max_sport_exposure: Cents(100_000),
            win_cooldown_seconds: 180,
            loss_cooldown_seconds: 300,
        }
    }
}

impl RiskConfig {
    pub fn from_env() -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            max_daily_loss: Cents(env::optional("MAX_DAILY_LOSS", d.max_daily_loss.0)?),
            max_game_exposure: Cents(env::optional("MAX_GAME_EXPOSURE", d.max_game_exposure.0)?),
            max_sport_exposure: Cents(env::optional("MAX_SPORT_EXPOSURE", d.max_sport_exposure.0)?),
            win_cooldown_seconds: env::optional("WIN_COOLDOWN_SECONDS", d.win_cooldown_seconds)?,
            loss_cooldown_seconds: env::optional("LOSS_COOLDOWN_SECONDS", d.loss_cooldown_seconds)?,
        })
    }
}

/// Liquidity thresholds, §6. Per-platform/per-sport overrides are read as
/// `LIQUIDITY_MIN_THRESHOLD_{PLATFORM|SPORT}` on top of the base value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LiquidityConfig {
    pub min_threshold: f64,
    pub max_position_pct: f64,
}

impl Default for LiquidityConfig {
    fn default() -> Self {
        Self {
            min_threshold: 100.0,
            max_position_pct: 0.10,
        }
    }
}

impl LiquidityConfig {
    pub fn from_env() -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            min_threshold: env::optional("LIQUIDITY_MIN_THRESHOLD", d.min_threshold)?,
            max_position_pct: env::optional("LIQUIDITY_MAX_POSITION_PCT", d.max_position_pct)?,
        })
    }

    /// Per-platform override, falling back to the base threshold.
    pub fn min_threshold_for(&self, suffix: &str) -> Result<f64> {
        let key = format!("LIQUIDITY_MIN_THRESHOLD_{}", suffix.to_ascii_uppercase());
        env::optional(&key, self.min_threshold)
    }
}
