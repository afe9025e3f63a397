use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::config::EdgeConfig;
use crate::domain::{Direction, OpenPosition, TradingRule, TradingSignal};

use super::rules::evaluate_rules;
use super::RejectReason;

/// Last-trade-outcome per `(game_id, team)`, keyed for the cooldown filter
/// (§4.5 filter 5). `true` means the last close on this team was a win.
pub type CooldownMap = HashMap<(String, String), (DateTime<Utc>, bool)>;

/// Sequential, fail-fast pre-trade filters (§4.5). Returns the first
/// rejection reason encountered, or `Ok(())` if the signal clears all six.
pub fn apply_filters(
    signal: &TradingSignal,
    cfg: &EdgeConfig,
    win_cooldown: Duration,
    loss_cooldown: Duration,
    cooldowns: &CooldownMap,
    existing_same_team: Option<&OpenPosition>,
    rules: &[TradingRule],
    now: DateTime<Utc>,
) -> Result<(), RejectReason> {
    if signal.market_prob.is_none() {
        return Err(RejectReason::NoMarket);
    }

    if signal.edge_pct.abs() < cfg.min_edge_pct * 100.0 {
        return Err(RejectReason::EdgeTooSmall);
    }

    if !signal.signal_type.is_risk_free() {
        let out_of_bounds = match signal.direction {
            Direction::Buy => signal.model_prob > cfg.max_buy_prob,
            Direction::Sell => signal.model_prob < cfg.min_sell_prob,
        };
        if out_of_bounds {
            return Err(RejectReason::ProbabilityOutOfBounds);
        }
    }

    if !cfg.allow_hedging {
        if let Some(existing) = existing_same_team {
            if existing.side == signal.direction.side() {
                return Err(RejectReason::DuplicatePosition);
            }
        }
    }

    let key = (signal.game_id.clone(), signal.team.clone());
    if let Some((last_trade, was_win)) = cooldowns.get(&key) {
        let cooldown = if *was_win { win_cooldown } else { loss_cooldown };
        if now.signed_duration_since(*last_trade) < cooldown {
            return Err(RejectReason::Cooldown);
        }
    }

    evaluate_rules(signal, rules)
}

#[cfg(test)]
mod tests {
    use crate::domain::{Platform, Side, Sport};

    use super::*;

    fn signal() -> TradingSignal {
        TradingSignal::new(
            "g1",
            Sport::NBA,
            "LAL",
            Direction::Buy,
            crate::domain::SignalType::ModelEdgeYes,
            0.7,
            Some(0.5),
            Some(Platform::Paper),
            Some(0.5),
            500.0,
            0.9,
        )
    }

    #[test]
    fn rejects_missing_market_prob() {
        let mut s = signal();
        s.market_prob = None;
        let cfg = EdgeConfig::default();
        let result = apply_filters(&s, &cfg, Duration::seconds(180), Duration::seconds(300), &CooldownMap::new(), None, &[], Utc::now());
        assert!(matches!(result, Err(RejectReason::NoMarket)));
    }

    #[test]
    fn rejects_below_min_edge() {
        let mut s = signal();
        s.edge_pct = 1.0;
        let cfg = EdgeConfig::default();
        let result = apply_filters(&s, &cfg, Duration::seconds(180), Duration::seconds(300), &CooldownMap::new(), None, &[], Utc::now());
        assert!(matches!(result, Err(RejectReason::EdgeTooSmall)));
    }

    #[test]
    fn rejects_duplicate_same_side() {
        let s = signal();
        let existing = OpenPosition::open("t1", "g1", Sport::NBA, "LAL", Side::Yes, Platform::Paper, "m1", 0.5, 10.0, crate::domain::Cents::ZERO);
        let cfg = EdgeConfig::default();
        let result = apply_filters(&s, &cfg, Duration::seconds(180), Duration::seconds(300), &CooldownMap::new(), Some(&existing), &[], Utc::now());
        assert!(matches!(result, Err(RejectReason::DuplicatePosition)));
    }

    #[test]
    fn cooldown_blocks_recent_win() {
        let s = signal();
        let mut cooldowns = CooldownMap::new();
        cooldowns.insert(("g1".into(), "LAL".into()), (Utc::now(), true));
        let cfg = EdgeConfig::default();
        let result = apply_filters(&s, &cfg, Duration::seconds(180), Duration::seconds(300), &cooldowns, None, &[], Utc::now());
        assert!(matches!(result, Err(RejectReason::Cooldown)));
    }
}
