use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{Platform, Side, Sport};
use super::Cents;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionStatus {
    Open,
    Closed,
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Push,
}

impl Outcome {
    #[must_use]
    pub fn from_net(net: Cents) -> Self {
        match net.0.cmp(&0) {
            std::cmp::Ordering::Greater => Outcome::Win,
            std::cmp::Ordering::Less => Outcome::Loss,
            std::cmp::Ordering::Equal => Outcome::Push,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenPosition {
    pub trade_id: String,
    pub game_id: String,
    pub sport: Sport,
    pub team: String,
    pub side: Side,
    pub platform: Platform,
    pub market_id: String,
    pub entry_price: f64,
    pub size: f64,
    pub entry_time: DateTime<Utc>,
    pub entry_fees: Cents,
    pub status: PositionStatus,
    pub exit_price: Option<f64>,
    pub exit_time: Option<DateTime<Utc>>,
    pub exit_fees: Option<Cents>,
    pub pnl_gross: Option<Cents>,
    pub pnl_net: Option<Cents>,
    pub outcome: Option<Outcome>,
}

impl OpenPosition {
    #[must_use]
    pub fn open(
        trade_id: impl Into<String>,
        game_id: impl Into<String>,
        sport: Sport,
        team: impl Into<String>,
        side: Side,
        platform: Platform,
        market_id: impl Into<String>,
        entry_price: f64,
        size: f64,
        entry_fees: Cents,
    ) -> Self {
        Self {
            trade_id: trade_id.into(),
            game_id: game_id.into(),
            sport,
            team: team.into(),
            side,
            platform,
            market_id: market_id.into(),
            entry_price,
            size,
            entry_time: Utc::now(),
            entry_fees,
            status: PositionStatus::Open,
            exit_price: None,
            exit_time: None,
            exit_fees: None,
            pnl_gross: None,
            pnl_net: None,
            outcome: None,
        }
    }

    #[must_use]
    pub fn held_for(&self, now: DateTime<Utc>) -> chrono::Duration {
        now.signed_duration_since(self.entry_time)
    }

    /// §4.7 close accounting: `gross = size * (exit - entry)` for Buy
    /// (Side::Yes), mirrored for Sell (Side::No).
    pub fn close(&mut self, exit_price: f64, settled: bool) {
        let now = Utc::now();
        let gross_dollars = match self.side {
            Side::Yes => self.size * (exit_price - self.entry_price),
            Side::No => self.size * (self.entry_price - exit_price),
        };
        let gross = Cents::from_decimal_dollars(
            rust_decimal::Decimal::try_from(gross_dollars).unwrap_or_default(),
        );
        let exit_value = self.size * exit_price;
        let exit_fees = Cents::from_fraction_of(
            self.platform.per_side_fee_pct(),
            Cents::from_price_and_size(exit_value, 1.0),
        );
        let net = gross - self.entry_fees - exit_fees;
        self.exit_price = Some(exit_price);
        self.exit_time = Some(now);
        self.exit_fees = Some(exit_fees);
        self.pnl_gross = Some(gross);
        self.pnl_net = Some(net);
        self.outcome = Some(Outcome::from_net(net));
        self.status = if settled {
            PositionStatus::Settled
        } else {
            PositionStatus::Closed
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_computes_net_exactly_in_cents() {
        let mut p = OpenPosition::open(
            "t1",
            "g1",
            Sport::NBA,
            "LAL",
            Side::Yes,
            Platform::Paper,
            "m1",
            0.50,
            100.0,
            Cents::from_price_and_size(0.007 * 0.50 * 100.0, 1.0),
        );
        p.close(0.54, false);
        assert_eq!(p.status, PositionStatus::Closed);
        assert_eq!(p.pnl_gross.unwrap().0, 400);
        assert_eq!(p.outcome, Some(Outcome::Win));
    }

    #[test]
    fn sell_side_mirrors_gross_sign() {
        let mut p = OpenPosition::open(
            "t1",
            "g1",
            Sport::NBA,
            "LAL",
            Side::No,
            Platform::Paper,
            "m1",
            0.50,
            100.0,
            Cents::ZERO,
        );
        p.close(0.40, false);
        // Sell exit below entry is a favorable move: gross positive.
        assert!(p.pnl_gross.unwrap().0 > 0);
    }
}
