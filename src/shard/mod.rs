//! Per-game monitor host (§4.4): polls live state, consumes market-price
//! streams, computes win probability, detects edge, emits signals.

pub mod edge;
pub mod monitor;
pub mod provider;
pub mod types;
pub mod win_prob;

pub use monitor::LiveStateProvider;
pub use provider::EspnLiveStateProvider;
pub use types::{GameContext, GameEntry, PriceListenerStats, ShardCommand, ShardHeartbeat};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::domain::MarketPrice;
use crate::messaging::{topics, HotBus};
use crate::store::Pool;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(10);

/// Hosts N concurrent per-game monitors for this process (§4.4). Games are
/// added/removed via `ShardCommand`s received from the orchestrator.
pub struct GameShard {
    shard_id: String,
    max_games: usize,
    bus: HotBus,
    pool: Pool,
    provider: Arc<dyn LiveStateProvider>,
    games: Arc<Mutex<HashMap<String, GameEntry>>>,
    stats: Arc<PriceListenerStats>,
}

impl GameShard {
    #[must_use]
    pub fn new(
        shard_id: impl Into<String>,
        max_games: usize,
        bus: HotBus,
        pool: Pool,
        provider: Arc<dyn LiveStateProvider>,
    ) -> Self {
        Self {
            shard_id: shard_id.into(),
            max_games,
            bus,
            pool,
            provider,
            games: Arc::new(Mutex::new(HashMap::new())),
            stats: Arc::new(PriceListenerStats::default()),
        }
    }

    /// Runs the command loop, price-ingest loop, and heartbeat loop
    /// concurrently until the process is torn down.
    pub async fn run(self: Arc<Self>) {
        let commands = self.clone().run_command_loop();
        let prices = self.clone().run_price_ingest_loop();
        let heartbeat = self.clone().run_heartbeat_loop();
        tokio::join!(commands, prices, heartbeat);
    }

    async fn run_command_loop(self: Arc<Self>) {
        let topic = topics::shard_command(&self.shard_id);
        let mut rx = self.bus.subscribe::<ShardCommand>(&topic);
        while let Some(received) = rx.recv().await {
            self.handle_command(received.payload).await;
        }
    }

    async fn handle_command(&self, command: ShardCommand) {
        match command {
            ShardCommand::AddGame { game_id, sport, home_team, away_team } => {
                let mut games = self.games.lock().await;
                if games.len() >= self.max_games {
                    warn!(shard_id = %self.shard_id, game_id, "rejecting add_game, shard at capacity");
                    return;
                }
                if games.contains_key(&game_id) {
                    return;
                }
                let context = Arc::new(Mutex::new(GameContext::new(
                    game_id.clone(),
                    sport,
                    home_team,
                    away_team,
                )));
                let cancel = CancellationToken::new();
                let handle = tokio::spawn(monitor::monitor_game(
                    context.clone(),
                    self.provider.clone(),
                    self.bus.clone(),
                    self.pool.clone(),
                    self.stats.clone(),
                    cancel.clone(),
                ));
                drop(handle);
                games.insert(game_id.clone(), GameEntry { context, cancel });
                info!(shard_id = %self.shard_id, game_id, "added game to shard");
            }
            ShardCommand::RemoveGame { game_id } => {
                let mut games = self.games.lock().await;
                if let Some(entry) = games.remove(&game_id) {
                    entry.cancel.cancel();
                    info!(shard_id = %self.shard_id, game_id, "removed game from shard");
                }
            }
        }
    }

    async fn run_price_ingest_loop(self: Arc<Self>) {
        let mut rx = self.bus.subscribe::<MarketPrice>("prices.*");
        while let Some(received) = rx.recv().await {
            self.stats.record_received();
            let price = received.payload;
            let games = self.games.lock().await;
            if let Some(entry) = games.get(&price.game_id) {
                let context = entry.context.clone();
                drop(games);
                let team = price.contract_team.clone();
                context.lock().await.record_price(&team, price);
            } else {
                self.stats.record_no_team_skipped();
            }
        }
    }

    async fn run_heartbeat_loop(self: Arc<Self>) {
        let mut interval = tokio::time::interval(HEARTBEAT_INTERVAL);
        loop {
            interval.tick().await;
            let games = self.games.lock().await;
            let heartbeat = ShardHeartbeat {
                shard_id: self.shard_id.clone(),
                game_count: games.len(),
                max_games: self.max_games,
                games: games.keys().cloned().collect(),
                timestamp: Utc::now(),
            };
            drop(games);
            if let Err(e) = self.bus.publish(topics::HEALTH_HEARTBEATS, &heartbeat).await {
                warn!(shard_id = %self.shard_id, error = %e, "failed to publish heartbeat");
            }
            let rate = self.stats.parse_failure_rate();
            if rate > 0.05 {
                tracing::error!(shard_id = %self.shard_id, rate, "parse failure rate exceeds 5% threshold");
            }
        }
    }
}
