use crate::cli::output;
use crate::config::Config;
use crate::error::Result;

/// Validates configuration from the environment, returning it so callers
/// (e.g. the connection check) don't have to reload it.
pub fn execute_config() -> Result<Config> {
    output::section("Configuration");
    let config = Config::from_env()?;
    output::success("environment parsed and validated");

    output::field("Paper trading", config.paper_trading);
    output::field("Min edge pct", config.edge.min_edge_pct);
    output::field("Kelly fraction", config.edge.kelly_fraction);
    output::field("Max daily loss", format!("{} cents", config.risk.max_daily_loss.0));
    output::field("Log format", format!("{:?}", config.logging.format));

    if config.paper_trading {
        output::field("Credentials", "not required (paper trading)");
    } else if config.credentials.kalshi_api_key.is_some() {
        output::success("Kalshi credentials present");
    } else {
        output::warning("live trading requested but KALSHI_API_KEY is unset");
    }

    Ok(config)
}
