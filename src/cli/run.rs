//! Handler for the `run` subcommand: loads configuration, wires up the
//! requested component's dependencies, and drives it to completion or
//! Ctrl+C (§5: "one process per subsystem instance").

use std::sync::Arc;

use tokio::signal;
use tracing::{error, info};
use uuid::Uuid;

use crate::cli::{banner, status, Component, RunArgs};
use crate::config::Config;
use crate::discovery::MarketDiscoveryService;
use crate::domain::Sport;
use crate::error::{Error, Result};
use crate::execution::ExecutionService;
use crate::messaging::{HotBus, Observer, StreamStore};
use crate::orchestrator::{Orchestrator, ScheduleProvider};
use crate::position_tracker::PositionTracker;
use crate::shard::{EspnLiveStateProvider, GameShard};
use crate::signal_processor::SignalProcessor;
use crate::store;

fn parse_sports(raw: &str) -> Result<Vec<Sport>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            serde_json::from_value(serde_json::Value::String(s.to_ascii_uppercase()))
                .map_err(|_| Error::Config(format!("unrecognized sport code: {s:?}")))
        })
        .collect()
}

/// Executes the `run` subcommand.
pub async fn execute(cli_log_level: Option<&str>, json_logs: bool, args: &RunArgs) -> Result<()> {
    let mut config = Config::from_env()?;
    if let Some(level) = cli_log_level {
        config.logging.filter = level.to_string();
    }
    if json_logs {
        config.logging.format = crate::config::LogFormat::Json;
    }
    config.init_logging();

    let component_name = args.component.name();
    if !args.no_banner {
        banner::print_banner(component_name);
    }

    if let Some(path) = &args.status_file {
        status::spawn_writer(path.clone(), component_name.to_string(), config.paper_trading);
    }

    info!(component = component_name, paper_trading = config.paper_trading, "edgelord starting");

    tokio::select! {
        result = run_component(config, args.component.clone()) => {
            if let Err(e) = result {
                error!(component = component_name, error = %e, "component exited with an error");
            }
        }
        _ = signal::ctrl_c() => {
            info!(component = component_name, "shutdown signal received (Ctrl+C)");
        }
    }

    info!(component = component_name, "edgelord stopped");
    Ok(())
}

async fn run_component(config: Config, component: Component) -> Result<()> {
    let bus = HotBus::connect(&config.redis_url, format!("edgelord-{}", component.name())).await?;
    let pool = store::create_pool(&config.database_url).await?;

    match component {
        Component::Orchestrator { sports, schedule_base_url } => {
            let sports = parse_sports(&sports)?;
            let provider = ScheduleProvider::new(schedule_base_url);
            let discovery = MarketDiscoveryService::new(bus.clone());
            let orchestrator = Orchestrator::new(sports, provider, discovery, bus, pool);
            orchestrator.run().await;
        }
        Component::Shard { shard_id, max_games, live_state_base_url } => {
            let provider = Arc::new(EspnLiveStateProvider::new(live_state_base_url));
            let shard = Arc::new(GameShard::new(shard_id, max_games, bus, pool, provider));
            shard.run().await;
        }
        Component::SignalProcessor => {
            let processor = SignalProcessor::new(config, pool, bus);
            processor.run().await;
        }
        Component::Execution => {
            let service = Arc::new(ExecutionService::new(config, bus, pool));
            service.run().await;
        }
        Component::PositionTracker => {
            let instance_id = Uuid::new_v4().to_string();
            let tracker = Arc::new(PositionTracker::new(instance_id, config, bus, pool).await?);
            tracker.run().await;
        }
        Component::Observer => {
            let client = redis::Client::open(config.redis_url.as_str())?;
            let manager = client.get_connection_manager().await?;
            Observer::new(bus, StreamStore::new(manager)).run().await;
        }
    }
    Ok(())
}
