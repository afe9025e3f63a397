//! Layered, environment-driven configuration (§6, §10), following the
//! teacher's submodule-per-concern layout: one struct per concern, each
//! with its own `from_env()`, assembled into a top-level [`Config`].

mod credentials;
mod edge;
mod env;
mod execution;
mod logging;
mod risk;
mod timing;

pub use credentials::Credentials;
pub use edge::EdgeConfig;
pub use execution::ExecutionConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use risk::{LiquidityConfig, RiskConfig};
pub use timing::{FreshnessConfig, HeartbeatConfig, PollingConfig};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub edge: EdgeConfig,
    pub risk: RiskConfig,
    pub liquidity: LiquidityConfig,
    pub freshness: FreshnessConfig,
    pub polling: PollingConfig,
    pub heartbeat: HeartbeatConfig,
    pub execution: ExecutionConfig,
    pub logging: LoggingConfig,
    #[serde(skip)]
    pub credentials: Credentials,
    pub paper_trading: bool,
    pub database_url: String,
    pub redis_url: String,
}

impl Config {
    /// Assembles configuration from environment variables, reading a
    /// `.env` file first if present (dev convenience, no-op in production
    /// where the orchestrator injects real env vars).
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let database_url = env::required("DATABASE_URL")?;
        let redis_url = env::required("REDIS_URL")?;

        let config = Self {
            edge: EdgeConfig::from_env()?,
            risk: RiskConfig::from_env()?,
            liquidity: LiquidityConfig::from_env()?,
            freshness: FreshnessConfig::from_env()?,
            polling: PollingConfig::from_env()?,
            heartbeat: HeartbeatConfig::from_env()?,
            execution: ExecutionConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
            credentials: Credentials::from_env()?,
            paper_trading: env::optional_bool("PAPER_TRADING", true)?,
            database_url,
            redis_url,
        };
        config.validate()?;
        Ok(config)
    }

    /// Range/sanity checks beyond "did it parse", mirroring the teacher's
    /// `Config::validate()`.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.edge.min_edge_pct) {
            return Err(Error::Config("MIN_EDGE_PCT must be in [0, 1)".to_string()));
        }
        if !(0.0..=1.0).contains(&self.edge.kelly_fraction) {
            return Err(Error::Config("KELLY_FRACTION must be in [0, 1]".to_string()));
        }
        if !(0.0..=1.0).contains(&self.edge.max_position_pct) {
            return Err(Error::Config("MAX_POSITION_PCT must be in [0, 1]".to_string()));
        }
        if !self.paper_trading && self.credentials.kalshi_api_key.is_none() {
            return Err(Error::Config(
                "live trading requires KALSHI_API_KEY (set PAPER_TRADING=true instead)".to_string(),
            ));
        }
        Ok(())
    }

    /// Installs the global tracing subscriber. Call once per entrypoint.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_out_of_range_min_edge() {
        let mut cfg = defaults_for_test();
        cfg.edge.min_edge_pct = 1.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_requires_kalshi_key_for_live_trading() {
        let mut cfg = defaults_for_test();
        cfg.paper_trading = false;
        assert!(cfg.validate().is_err());
    }

    fn defaults_for_test() -> Config {
        Config {
            edge: EdgeConfig::default(),
            risk: RiskConfig::default(),
            liquidity: LiquidityConfig::default(),
            freshness: FreshnessConfig::default(),
            polling: PollingConfig::default(),
            heartbeat: HeartbeatConfig::default(),
            execution: ExecutionConfig::default(),
            logging: LoggingConfig::default(),
            credentials: Credentials::default(),
            paper_trading: true,
            database_url: "postgres://localhost/test".to_string(),
            redis_url: "redis://localhost".to_string(),
        }
    }
}
