//! Take-profit / stop-loss evaluation against the live mark (§4.7).

use chrono::{DateTime, Utc};

use crate::config::PollingConfig;
use crate::domain::{MarketPrice, OpenPosition, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
}

impl ExitReason {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            ExitReason::TakeProfit => "take_profit",
            ExitReason::StopLoss => "stop_loss",
        }
    }
}

/// Mark-to-market price for the side a position holds, in the same scale
/// `OpenPosition::close` expects: the current yes-bid for a held Yes side,
/// the complementary no-bid (`1 - yes_ask`) for a held No side.
#[must_use]
pub fn mark_price(position: &OpenPosition, price: &MarketPrice) -> f64 {
    match position.side {
        Side::Yes => price.yes_bid,
        Side::No => 1.0 - price.yes_ask,
    }
}

fn pct_change(position: &OpenPosition, exit_price: f64) -> f64 {
    match position.side {
        Side::Yes => (exit_price - position.entry_price) / position.entry_price,
        Side::No => (position.entry_price - exit_price) / position.entry_price,
    }
}

/// Evaluates exit conditions against the current mark, honoring the
/// minimum hold window first (§4.7). Returns the exit price to submit
/// alongside the reason, since callers need both to build the close order.
#[must_use]
pub fn check_exit(
    position: &OpenPosition,
    price: &MarketPrice,
    polling: &PollingConfig,
    now: DateTime<Utc>,
) -> Option<(f64, ExitReason)> {
    if position.held_for(now) < chrono::Duration::seconds(polling.min_hold_seconds as i64) {
        return None;
    }
    let exit_price = mark_price(position, price).clamp(0.0, 1.0);
    let deep_itm = match position.side {
        Side::Yes => exit_price > 0.85,
        Side::No => exit_price < 0.15,
    };
    if deep_itm {
        return None;
    }
    let change = pct_change(position, exit_price);
    if change >= polling.take_profit_pct {
        Some((exit_price, ExitReason::TakeProfit))
    } else if change <= -position.sport.stop_loss_pct() {
        Some((exit_price, ExitReason::StopLoss))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Platform, Sport};

    fn position(side: Side, entry_price: f64, sport: Sport) -> OpenPosition {
        let mut p = OpenPosition::open(
            "t1", "g1", sport, "LAL", side, Platform::Paper, "m1", entry_price, 10.0,
            crate::domain::Cents::ZERO,
        );
        p.entry_time = Utc::now() - chrono::Duration::seconds(3600);
        p
    }

    fn price(bid: f64, ask: f64) -> MarketPrice {
        MarketPrice {
            game_id: "g1".into(),
            platform: Platform::Paper,
            contract_team: "LAL".into(),
            yes_bid: bid,
            yes_ask: ask,
            yes_bid_size: 500.0,
            yes_ask_size: 500.0,
            timestamp: Utc::now(),
            publisher_seq: 1,
        }
    }

    fn polling() -> PollingConfig {
        PollingConfig::default()
    }

    #[test]
    fn min_hold_blocks_early_exit() {
        let mut p = position(Side::Yes, 0.50, Sport::NBA);
        p.entry_time = Utc::now();
        let result = check_exit(&p, &price(0.70, 0.72), &polling(), Utc::now());
        assert!(result.is_none());
    }

    #[test]
    fn take_profit_triggers_on_favorable_yes_move() {
        let p = position(Side::Yes, 0.50, Sport::NBA);
        // 0.62 bid vs 0.50 entry = +24% >= 8% default take profit.
        let result = check_exit(&p, &price(0.62, 0.64), &polling(), Utc::now());
        assert_eq!(result.map(|(_, r)| r), Some(ExitReason::TakeProfit));
    }

    #[test]
    fn stop_loss_triggers_at_sport_specific_threshold() {
        let p = position(Side::Yes, 0.50, Sport::NBA);
        // NBA stop-loss is 3%; yes_bid 0.48 is a 4% adverse move.
        let result = check_exit(&p, &price(0.48, 0.50), &polling(), Utc::now());
        assert_eq!(result.map(|(_, r)| r), Some(ExitReason::StopLoss));
    }

    #[test]
    fn no_side_profits_when_mark_drops_below_entry() {
        let p = position(Side::No, 0.50, Sport::NBA);
        let result = check_exit(&p, &price(0.60, 0.62), &polling(), Utc::now());
        assert_eq!(result.map(|(_, r)| r), Some(ExitReason::TakeProfit));
    }

    #[test]
    fn deep_itm_yes_holds_for_settlement_instead_of_taking_profit() {
        let p = position(Side::Yes, 0.50, Sport::NBA);
        // 0.90 bid is a huge favorable move that would otherwise take profit;
        // deep ITM should hold for settlement instead.
        let result = check_exit(&p, &price(0.90, 0.92), &polling(), Utc::now());
        assert!(result.is_none());
    }

    #[test]
    fn deep_itm_no_holds_for_settlement_instead_of_taking_profit() {
        let p = position(Side::No, 0.50, Sport::NBA);
        // mark = 1 - yes_ask = 0.90, deep ITM for the No side.
        let result = check_exit(&p, &price(0.08, 0.10), &polling(), Utc::now());
        assert!(result.is_none());
    }
}
