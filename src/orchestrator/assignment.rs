use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::shard::ShardHeartbeat;

const HEARTBEAT_INTERVAL_SECS: i64 = 10;
const UNHEALTHY_MULTIPLIER: i64 = 3;

struct ShardRecord {
    last_heartbeat: DateTime<Utc>,
    game_count: usize,
    max_games: usize,
}

/// Tracks known shard identities and their most recent heartbeat, and
/// picks the healthy shard with fewest assignments for a new game (§4.3).
#[derive(Default)]
pub struct ShardRegistry {
    shards: HashMap<String, ShardRecord>,
}

impl ShardRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_heartbeat(&mut self, heartbeat: &ShardHeartbeat) {
        self.shards.insert(
            heartbeat.shard_id.clone(),
            ShardRecord {
                last_heartbeat: heartbeat.timestamp,
                game_count: heartbeat.game_count,
                max_games: heartbeat.max_games,
            },
        );
    }

    /// A shard is unhealthy once its heartbeat is missing for more than
    /// `3 * HEARTBEAT_INTERVAL_SECS` (§4.3).
    #[must_use]
    pub fn is_healthy(&self, shard_id: &str, now: DateTime<Utc>) -> bool {
        self.shards
            .get(shard_id)
            .is_some_and(|record| now.signed_duration_since(record.last_heartbeat) < Duration::seconds(HEARTBEAT_INTERVAL_SECS * UNHEALTHY_MULTIPLIER))
    }

    /// Unhealthy shard ids whose games need reassignment.
    #[must_use]
    pub fn unhealthy_shards(&self, now: DateTime<Utc>) -> Vec<String> {
        self.shards
            .keys()
            .filter(|id| !self.is_healthy(id, now))
            .cloned()
            .collect()
    }

    /// Healthy shard with the fewest assigned games and spare capacity, or
    /// `None` if no healthy shard has room.
    #[must_use]
    pub fn least_loaded_healthy_shard(&self, now: DateTime<Utc>) -> Option<String> {
        self.shards
            .iter()
            .filter(|(id, record)| self.is_healthy(id, now) && record.game_count < record.max_games)
            .min_by_key(|(_, record)| record.game_count)
            .map(|(id, _)| id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heartbeat(shard_id: &str, game_count: usize, timestamp: DateTime<Utc>) -> ShardHeartbeat {
        ShardHeartbeat {
            shard_id: shard_id.to_string(),
            game_count,
            max_games: 50,
            games: Vec::new(),
            timestamp,
        }
    }

    #[test]
    fn picks_least_loaded_healthy_shard() {
        let now = Utc::now();
        let mut registry = ShardRegistry::new();
        registry.record_heartbeat(&heartbeat("shard-a", 10, now));
        registry.record_heartbeat(&heartbeat("shard-b", 3, now));
        assert_eq!(registry.least_loaded_healthy_shard(now), Some("shard-b".to_string()));
    }

    #[test]
    fn stale_heartbeat_marks_shard_unhealthy() {
        let now = Utc::now();
        let mut registry = ShardRegistry::new();
        registry.record_heartbeat(&heartbeat("shard-a", 1, now - Duration::seconds(1000)));
        assert!(!registry.is_healthy("shard-a", now));
        assert_eq!(registry.least_loaded_healthy_shard(now), None);
    }
}
