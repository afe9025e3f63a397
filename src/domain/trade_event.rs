use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::Sport;

/// Published on `trades` whenever a position closes (§4.7), and consumed by
/// the signal processor to drive the per-team win/loss cooldown (§4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeClosedEvent {
    pub game_id: String,
    pub sport: Sport,
    pub team: String,
    pub won: bool,
    pub closed_at: DateTime<Utc>,
}
