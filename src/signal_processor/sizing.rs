use crate::config::{EdgeConfig, LiquidityConfig};
use crate::domain::{Bankroll, Cents, Platform, TradingSignal};

const FLOOR_DOLLARS: f64 = 1.0;

/// Fractional-Kelly position sizing (§4.5): reserves round-trip fees, caps
/// at `MAX_POSITION_PCT` of bankroll and `LIQUIDITY_MAX_POSITION_PCT` of the
/// available book, floors at $1.
#[must_use]
pub fn size_position(
    signal: &TradingSignal,
    edge: &EdgeConfig,
    liquidity: &LiquidityConfig,
    bankroll: &Bankroll,
    venue: Platform,
) -> f64 {
    let kelly = signal.kelly_fraction();
    let fee_adjusted = (kelly - venue.round_trip_fee_pct()).max(0.0);
    let position_pct = (fee_adjusted * edge.kelly_fraction).min(edge.max_position_pct);

    let bankroll_dollars = bankroll.current_balance.as_dollars();
    let by_bankroll = bankroll_dollars * position_pct;

    let liquidity_cap = signal.liquidity_available * liquidity.max_position_pct;

    by_bankroll.min(liquidity_cap).max(FLOOR_DOLLARS)
}

/// Converts a dollar stake into contract count at the given limit price.
#[must_use]
pub fn contract_count(stake_dollars: f64, limit_price: f64) -> f64 {
    if limit_price <= 0.0 {
        return 0.0;
    }
    stake_dollars / limit_price
}

#[must_use]
pub fn notional_cents(stake_dollars: f64) -> Cents {
    Cents::from_price_and_size(stake_dollars, 1.0)
}

#[cfg(test)]
mod tests {
    use crate::domain::{Direction, SignalType, Sport};

    use super::*;

    #[test]
    fn sizing_floors_at_one_dollar() {
        let signal = TradingSignal::new(
            "g1",
            Sport::NBA,
            "LAL",
            Direction::Buy,
            SignalType::ModelEdgeYes,
            0.51,
            Some(0.50),
            Some(Platform::Paper),
            Some(0.50),
            1000.0,
            0.5,
        );
        let bankroll = Bankroll::initial(Cents(10_000));
        let size = size_position(&signal, &EdgeConfig::default(), &LiquidityConfig::default(), &bankroll, Platform::Paper);
        assert!(size >= FLOOR_DOLLARS);
    }

    #[test]
    fn sizing_respects_liquidity_cap() {
        let signal = TradingSignal::new(
            "g1",
            Sport::NBA,
            "LAL",
            Direction::Buy,
            SignalType::ModelEdgeYes,
            0.90,
            Some(0.50),
            Some(Platform::Paper),
            Some(0.50),
            10.0,
            0.9,
        );
        let bankroll = Bankroll::initial(Cents(10_000_000));
        let size = size_position(&signal, &EdgeConfig::default(), &LiquidityConfig::default(), &bankroll, Platform::Paper);
        assert!(size <= 10.0 * LiquidityConfig::default().max_position_pct + 1e-9);
    }
}
