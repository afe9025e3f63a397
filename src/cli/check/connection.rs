use crate::cli::output;
use crate::config::Config;
use crate::error::Result;
use crate::messaging::HotBus;
use crate::store;

/// Exercises the same two connections every component makes at startup:
/// the Redis-backed hot bus and the Postgres pool (§5 shared-resource
/// policy).
pub async fn execute_connection(config: &Config) -> Result<()> {
    output::section("Connectivity");

    output::field("Redis", &config.redis_url);
    let bus = HotBus::connect(&config.redis_url, "cli-check").await?;
    output::success("connected to the hot bus");
    drop(bus);

    output::field("Postgres", &config.database_url);
    let pool = store::create_pool(&config.database_url).await?;
    sqlx::query("SELECT 1").execute(&pool).await?;
    output::success("connected to the store and ran a test query");
    pool.close().await;

    Ok(())
}
