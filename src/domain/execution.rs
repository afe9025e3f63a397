use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{Direction, Platform, Side, Sport};
use super::Cents;

/// §3: `idempotency_key = "{game_id}:{team}:{direction}"`, unique across the
/// in-flight set.
#[must_use]
pub fn idempotency_key(game_id: &str, team: &str, direction: Direction) -> String {
    format!("{game_id}:{team}:{}", direction.as_str())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub request_id: String,
    pub idempotency_key: String,
    pub game_id: String,
    pub sport: Sport,
    pub signal_id: String,
    pub platform: Platform,
    pub market_id: String,
    pub contract_team: String,
    pub side: Side,
    /// Order action: `Buy` opens a new position, `Sell` closes one (§4.7
    /// exits always sell the side the position holds). Entries from the
    /// signal processor are always `Buy`.
    pub action: Direction,
    pub limit_price: f64,
    pub size: f64,
    pub edge_pct: f64,
    pub model_prob: f64,
    pub market_prob: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl ExecutionRequest {
    #[must_use]
    pub fn client_order_id(counter: u64) -> String {
        let unix_seconds = Utc::now().timestamp();
        format!("arb{unix_seconds}{counter}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Filled,
    Partial,
    Cancelled,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub request_id: String,
    pub idempotency_key: String,
    pub status: ExecutionStatus,
    pub order_id: Option<String>,
    pub filled_qty: f64,
    pub avg_price: f64,
    /// Fee charged on this fill alone, at the platform's per-side rate; an
    /// exit's `entry_fees` here is really the exit leg's fee (§4.7 close
    /// accounting reads it that way, keyed off which leg produced the result).
    pub entry_fees: Cents,
    pub error: Option<String>,
    pub platform: Platform,
    pub game_id: String,
    pub market_id: String,
    pub contract_team: String,
    pub side: Side,
    pub action: Direction,
    pub requested_at: DateTime<Utc>,
    pub executed_at: DateTime<Utc>,
    pub latency_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idempotency_key_matches_spec_format() {
        assert_eq!(
            idempotency_key("g1", "LAL", Direction::Buy),
            "g1:LAL:buy"
        );
    }

    #[test]
    fn execution_request_json_round_trips() {
        let req = ExecutionRequest {
            request_id: "r1".into(),
            idempotency_key: "g1:LAL:buy".into(),
            game_id: "g1".into(),
            sport: Sport::NBA,
            signal_id: "s1".into(),
            platform: Platform::Paper,
            market_id: "m1".into(),
            contract_team: "LAL".into(),
            side: Side::Yes,
            action: Direction::Buy,
            limit_price: 0.62,
            size: 100.0,
            edge_pct: 13.0,
            model_prob: 0.74,
            market_prob: Some(0.61),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&req).unwrap();
        let back: ExecutionRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.request_id, req.request_id);
        assert_eq!(back.idempotency_key, req.idempotency_key);
        assert_eq!(back.limit_price, req.limit_price);
    }
}
