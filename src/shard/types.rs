use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{MarketPrice, Sport};

/// Per-game context a monitor task needs: identity, venues' market ids, and
/// the freshest known price per contract team, replacing per-tick RPC
/// round-trips with an in-memory lookup.
#[derive(Debug, Clone)]
pub struct GameContext {
    pub game_id: String,
    pub sport: Sport,
    pub home_team: String,
    pub away_team: String,
    pub home_prices: Vec<MarketPrice>,
    pub away_prices: Vec<MarketPrice>,
}

impl GameContext {
    #[must_use]
    pub fn new(game_id: impl Into<String>, sport: Sport, home_team: impl Into<String>, away_team: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            sport,
            home_team: home_team.into(),
            away_team: away_team.into(),
            home_prices: Vec::new(),
            away_prices: Vec::new(),
        }
    }

    /// Upserts by venue so both Kalshi's and Polymarket's last-known price
    /// survive side by side, which cross-venue arbitrage checks need.
    pub fn record_price(&mut self, team: &str, price: MarketPrice) {
        let prices = if team == self.home_team {
            &mut self.home_prices
        } else if team == self.away_team {
            &mut self.away_prices
        } else {
            return;
        };
        match prices.iter_mut().find(|p| p.platform == price.platform) {
            Some(existing) => *existing = price,
            None => prices.push(price),
        }
    }

    #[must_use]
    pub fn freshest_home_price(&self) -> Option<&MarketPrice> {
        self.home_prices.iter().max_by_key(|p| p.timestamp)
    }

    #[must_use]
    pub fn freshest_away_price(&self) -> Option<&MarketPrice> {
        self.away_prices.iter().max_by_key(|p| p.timestamp)
    }

    /// Two fresh, valid-book quotes for the same team on different venues,
    /// if both are currently on file (§4.4 arbitrage scan).
    #[must_use]
    pub fn home_venue_pair(&self) -> Option<(&MarketPrice, &MarketPrice)> {
        venue_pair(&self.home_prices)
    }

    #[must_use]
    pub fn away_venue_pair(&self) -> Option<(&MarketPrice, &MarketPrice)> {
        venue_pair(&self.away_prices)
    }
}

/// First two distinct-venue entries in `prices`, arbitrarily ordered; `None`
/// unless at least two venues currently have a quote on file.
fn venue_pair(prices: &[MarketPrice]) -> Option<(&MarketPrice, &MarketPrice)> {
    let mut iter = prices.iter();
    let first = iter.next()?;
    let second = iter.find(|p| p.platform != first.platform)?;
    Some((first, second))
}

/// One entry in a shard's in-memory game table, tracking the monitor's
/// cancellation handle alongside its shared, mutable context (shared with
/// the spawned monitor task so price updates are visible to both).
pub struct GameEntry {
    pub context: std::sync::Arc<tokio::sync::Mutex<GameContext>>,
    pub cancel: tokio_util::sync::CancellationToken,
}

/// Orchestrator -> shard commands on `shard:{shard_id}:command` (§4.4
/// supplemental).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ShardCommand {
    AddGame {
        game_id: String,
        sport: Sport,
        home_team: String,
        away_team: String,
    },
    RemoveGame {
        game_id: String,
    },
}

/// Heartbeat payload published on `health:heartbeats` by every shard
/// (§4.4 supplemental, and §3's general heartbeat shape).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShardHeartbeat {
    pub shard_id: String,
    pub game_count: usize,
    pub max_games: usize,
    pub games: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Atomic price-listener counters, carried by every price consumer, not
/// just the position tracker (§3 supplemental).
#[derive(Debug, Default)]
pub struct PriceListenerStats {
    pub messages_received: AtomicU64,
    pub messages_processed: AtomicU64,
    pub parse_failures: AtomicU64,
    pub no_liquidity_skipped: AtomicU64,
    pub no_team_skipped: AtomicU64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PriceListenerStatsSnapshot {
    pub messages_received: u64,
    pub messages_processed: u64,
    pub parse_failures: u64,
    pub no_liquidity_skipped: u64,
    pub no_team_skipped: u64,
}

impl PriceListenerStats {
    #[must_use]
    pub fn snapshot(&self) -> PriceListenerStatsSnapshot {
        PriceListenerStatsSnapshot {
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_processed: self.messages_processed.load(Ordering::Relaxed),
            parse_failures: self.parse_failures.load(Ordering::Relaxed),
            no_liquidity_skipped: self.no_liquidity_skipped.load(Ordering::Relaxed),
            no_team_skipped: self.no_team_skipped.load(Ordering::Relaxed),
        }
    }

    pub fn record_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_processed(&self) {
        self.messages_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_parse_failure(&self) {
        self.parse_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_no_liquidity_skipped(&self) {
        self.no_liquidity_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_no_team_skipped(&self) {
        self.no_team_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Parse-failure rate over all received messages; §4.7 "raise ERROR if
    /// parse-failure rate > 5%" applies this same computation.
    #[must_use]
    pub fn parse_failure_rate(&self) -> f64 {
        let received = self.messages_received.load(Ordering::Relaxed);
        if received == 0 {
            return 0.0;
        }
        self.parse_failures.load(Ordering::Relaxed) as f64 / received as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_failure_rate_computed_from_counters() {
        let stats = PriceListenerStats::default();
        for _ in 0..100 {
            stats.record_received();
        }
        for _ in 0..6 {
            stats.record_parse_failure();
        }
        assert!(stats.parse_failure_rate() > 0.05);
    }

    fn price(platform: crate::domain::Platform, bid: f64) -> MarketPrice {
        MarketPrice {
            game_id: "g1".into(),
            platform,
            contract_team: "LAL".into(),
            yes_bid: bid,
            yes_ask: bid + 0.02,
            yes_bid_size: 500.0,
            yes_ask_size: 500.0,
            timestamp: Utc::now(),
            publisher_seq: 1,
        }
    }

    #[test]
    fn record_price_upserts_per_venue_instead_of_overwriting() {
        use crate::domain::Platform;

        let mut ctx = GameContext::new("g1", Sport::NBA, "LAL", "BOS");
        ctx.record_price("LAL", price(Platform::Kalshi, 0.55));
        ctx.record_price("LAL", price(Platform::Polymarket, 0.58));
        assert_eq!(ctx.home_prices.len(), 2);

        ctx.record_price("LAL", price(Platform::Kalshi, 0.60));
        assert_eq!(ctx.home_prices.len(), 2);
        let kalshi = ctx.home_prices.iter().find(|p| p.platform == Platform::Kalshi).unwrap();
        assert!((kalshi.yes_bid - 0.60).abs() < 1e-9);
    }

    #[test]
    fn venue_pair_requires_two_distinct_venues() {
        use crate::domain::Platform;

        let mut ctx = GameContext::new("g1", Sport::NBA, "LAL", "BOS");
        assert!(ctx.home_venue_pair().is_none());
        ctx.record_price("LAL", price(Platform::Kalshi, 0.55));
        assert!(ctx.home_venue_pair().is_none());
        ctx.record_price("LAL", price(Platform::Polymarket, 0.58));
        assert!(ctx.home_venue_pair().is_some());
    }
}
