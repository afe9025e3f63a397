use crate::domain::MarketPrice;

/// One side's model-vs-market edge, in percentage points (§4.4:
/// `edge = (model_prob - market_mid) * 100`).
#[derive(Debug, Clone, Copy)]
pub struct TeamEdge {
    pub model_prob: f64,
    pub market_mid: f64,
    pub edge_pct: f64,
}

#[must_use]
pub fn model_edge(model_prob: f64, price: &MarketPrice) -> TeamEdge {
    let market_mid = price.mid();
    TeamEdge {
        model_prob,
        market_mid,
        edge_pct: (model_prob - market_mid) * 100.0,
    }
}

/// Picks the team with the larger absolute edge between home and away, so
/// a monitor never emits both sides of the same game (§4.4 step 6).
#[must_use]
pub fn larger_absolute_edge(home: TeamEdge, away: TeamEdge) -> (bool, TeamEdge) {
    if home.edge_pct.abs() >= away.edge_pct.abs() {
        (true, home)
    } else {
        (false, away)
    }
}

/// Cross-venue arbitrage check (§4.4): if buying YES on A and NO on B
/// (mirrored, via `1 - yes_bid_B`) sums to less than 1.0 net of round-trip
/// fees, the pair is risk-free.
#[must_use]
pub fn arbitrage_net_cost(venue_a: &MarketPrice, venue_b: &MarketPrice, round_trip_fee_pct: f64) -> f64 {
    let raw = venue_a.yes_ask + (1.0 - venue_b.yes_bid);
    raw * (1.0 + round_trip_fee_pct)
}

#[must_use]
pub fn has_arbitrage(venue_a: &MarketPrice, venue_b: &MarketPrice, round_trip_fee_pct: f64) -> bool {
    arbitrage_net_cost(venue_a, venue_b, round_trip_fee_pct) < 1.0
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::Platform;

    fn price(bid: f64, ask: f64, platform: Platform) -> MarketPrice {
        MarketPrice {
            game_id: "g1".into(),
            platform,
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
    fn larger_absolute_edge_picks_bigger_magnitude() {
        let home = TeamEdge { model_prob: 0.6, market_mid: 0.5, edge_pct: 10.0 };
        let away = TeamEdge { model_prob: 0.4, market_mid: 0.48, edge_pct: -8.0 };
        let (is_home, edge) = larger_absolute_edge(home, away);
        assert!(is_home);
        assert!((edge.edge_pct - 10.0).abs() < 1e-9);
    }

    #[test]
    fn arbitrage_detected_when_combined_cost_under_one() {
        let a = price(0.40, 0.42, Platform::Kalshi);
        let b = price(0.60, 0.62, Platform::Polymarket);
        // 0.42 + (1 - 0.60) = 0.82, well under 1.0 even after fees.
        assert!(has_arbitrage(&a, &b, 0.014));
    }

    #[test]
    fn no_arbitrage_when_combined_cost_over_one() {
        let a = price(0.55, 0.58, Platform::Kalshi);
        let b = price(0.55, 0.58, Platform::Polymarket);
        assert!(!has_arbitrage(&a, &b, 0.014));
    }
}
