use serde::{Deserialize, Serialize};

use super::env;
use crate::error::Result;

/// Edge/sizing thresholds, §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    pub min_edge_pct: f64,
    pub kelly_fraction: f64,
    pub max_position_pct: f64,
    pub max_buy_prob: f64,
    pub min_sell_prob: f64,
    pub allow_hedging: bool,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            min_edge_pct: 0.03,
            kelly_fraction: 0.25,
            max_position_pct: 0.05,
            max_buy_prob: 0.95,
            min_sell_prob: 0.05,
            allow_hedging: false,
        }
    }
}

impl EdgeConfig {
    pub fn from_env() -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            min_edge_pct: env::optional("MIN_EDGE_PCT", d.min_edge_pct)?,
            kelly_fraction: env::optional("KELLY_FRACTION", d.kelly_fraction)?,
            max_position_pct: env::optional("MAX_POSITION_PCT", d.max_position_pct)?,
            max_buy_prob: env::optional("MAX_BUY_PROB", d.max_buy_prob)?,
            min_sell_prob: env::optional("MIN_SELL_PROB", d.min_sell_prob)?,
            allow_hedging: env::optional_bool("ALLOW_HEDGING", d.allow_hedging)?,
        })
    }
}
