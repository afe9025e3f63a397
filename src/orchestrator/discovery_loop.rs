use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use super::Orchestrator;
use crate::domain::Game;
use crate::messaging::topics;
use crate::shard::ShardCommand;

const DISCOVERY_INTERVAL: Duration = Duration::from_secs(60);

impl Orchestrator {
    pub(super) async fn run_discovery_loop(&self) {
        let mut interval = tokio::time::interval(DISCOVERY_INTERVAL);
        loop {
            interval.tick().await;
            for &sport in &self.sports {
                match self.provider.fetch_live_games(sport).await {
                    Ok(games) => self.process_games(games).await,
                    Err(e) => warn!(sport = sport.as_str(), error = %e, "schedule fetch failed"),
                }
            }
        }
    }

    async fn process_games(&self, games: Vec<Game>) {
        for game in games {
            if let Err(e) = crate::store::upsert_game(&self.pool, &game).await {
                warn!(game_id = %game.game_id, error = %e, "failed to upsert game");
                continue;
            }
            if game.is_terminal() {
                continue;
            }

            let markets = match self
                .discovery
                .find_moneyline_markets(game.sport, &game.home_team, &game.away_team)
                .await
            {
                Ok(m) => m,
                Err(e) => {
                    warn!(game_id = %game.game_id, error = %e, "market discovery failed");
                    continue;
                }
            };
            if markets.is_empty() {
                continue;
            }

            let Some(shard_id) = self.registry.lock().await.least_loaded_healthy_shard(Utc::now()) else {
                warn!(game_id = %game.game_id, "no healthy shard with capacity, deferring assignment");
                continue;
            };

            let command = ShardCommand::AddGame {
                game_id: game.game_id.clone(),
                sport: game.sport,
                home_team: game.home_team.clone(),
                away_team: game.away_team.clone(),
            };
            let topic = topics::shard_command(&shard_id);
            if let Err(e) = self.bus.publish(&topic, &command).await {
                warn!(game_id = %game.game_id, shard_id, error = %e, "failed to publish shard assignment");
            } else {
                info!(game_id = %game.game_id, shard_id, "assigned game to shard");
            }
        }
    }
}
