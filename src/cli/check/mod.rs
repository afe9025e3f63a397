//! Configuration and connectivity validation, run without starting a
//! component process.

mod config;
mod connection;

pub use config::execute_config;
pub use connection::execute_connection;

use crate::cli::output;
use crate::error::Result;

/// Runs both the config and connection checks, matching the `edgelord
/// check` entrypoint: config first (cheap, no I/O), then live connectivity.
pub async fn execute() -> Result<()> {
    let config = execute_config()?;
    execute_connection(&config).await?;
    output::section("Result");
    output::success("all checks passed");
    Ok(())
}
