use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::Platform;

/// Top-of-book snapshot for one contract. §3 invariant: `0 <= yes_bid <=
/// yes_ask <= 1`. Carries a publisher sequence so consumers can detect gaps
/// without reordering (§5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketPrice {
    pub game_id: String,
    pub platform: Platform,
    pub contract_team: String,
    pub yes_bid: f64,
    pub yes_ask: f64,
    pub yes_bid_size: f64,
    pub yes_ask_size: f64,
    pub timestamp: DateTime<Utc>,
    pub publisher_seq: u64,
}

impl MarketPrice {
    /// A book of `bid=0, ask=1` carries no tradeable liquidity (§3).
    #[must_use]
    pub fn is_pathological(&self) -> bool {
        self.yes_bid <= 0.0 && self.yes_ask >= 1.0
    }

    #[must_use]
    pub fn mid(&self) -> f64 {
        (self.yes_bid + self.yes_ask) / 2.0
    }

    #[must_use]
    pub fn spread(&self) -> f64 {
        self.yes_ask - self.yes_bid
    }

    #[must_use]
    pub fn is_fresh(&self, ttl: chrono::Duration, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.timestamp) < ttl
    }

    #[must_use]
    pub fn is_valid_book(&self) -> bool {
        (0.0..=1.0).contains(&self.yes_bid)
            && (0.0..=1.0).contains(&self.yes_ask)
            && self.yes_bid <= self.yes_ask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(bid: f64, ask: f64) -> MarketPrice {
        MarketPrice {
            game_id: "g1".into(),
            platform: Platform::Paper,
            contract_team: "HOME".into(),
            yes_bid: bid,
            yes_ask: ask,
            yes_bid_size: 500.0,
            yes_ask_size: 500.0,
            timestamp: Utc::now(),
            publisher_seq: 1,
        }
    }

    #[test]
    fn pathological_book_detected() {
        assert!(price(0.0, 1.0).is_pathological());
        assert!(!price(0.60, 0.62).is_pathological());
    }

    #[test]
    fn mid_and_spread() {
        let p = price(0.60, 0.62);
        assert!((p.mid() - 0.61).abs() < 1e-9);
        assert!((p.spread() - 0.02).abs() < 1e-9);
    }
}
