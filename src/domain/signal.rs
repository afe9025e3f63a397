use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::types::{Direction, Platform, Sport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    ModelEdgeYes,
    ModelEdgeNo,
    Arbitrage,
}

impl SignalType {
    /// Arbitrage signals bypass the probability-bound pre-trade filter
    /// (§4.5 filter 3) since they aren't a directional model bet.
    #[must_use]
    pub fn is_risk_free(&self) -> bool {
        matches!(self, SignalType::Arbitrage)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingSignal {
    pub signal_id: String,
    pub game_id: String,
    pub sport: Sport,
    pub team: String,
    pub direction: Direction,
    pub signal_type: SignalType,
    pub model_prob: f64,
    pub market_prob: Option<f64>,
    pub edge_pct: f64,
    pub platform_buy: Option<Platform>,
    pub buy_price: Option<f64>,
    pub liquidity_available: f64,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TradingSignal {
    #[must_use]
    pub fn new(
        game_id: impl Into<String>,
        sport: Sport,
        team: impl Into<String>,
        direction: Direction,
        signal_type: SignalType,
        model_prob: f64,
        market_prob: Option<f64>,
        platform_buy: Option<Platform>,
        buy_price: Option<f64>,
        liquidity_available: f64,
        confidence: f64,
    ) -> Self {
        let edge_pct = match market_prob {
            Some(mp) => (model_prob - mp) * 100.0,
            None => 0.0,
        };
        let created_at = Utc::now();
        Self {
            signal_id: uuid::Uuid::new_v4().to_string(),
            game_id: game_id.into(),
            sport,
            team: team.into(),
            direction,
            signal_type,
            model_prob,
            market_prob,
            edge_pct,
            platform_buy,
            buy_price,
            liquidity_available,
            confidence,
            created_at,
            expires_at: created_at + Duration::seconds(30),
        }
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Fractional Kelly stake as a fraction of bankroll, §4.5/§9.
    /// `f* = (b*p - q) / b` where `b = 1/market_price - 1`.
    #[must_use]
    pub fn kelly_fraction(&self) -> f64 {
        let Some(market_prob) = self.market_prob else {
            return 0.0;
        };
        if market_prob <= 0.0 || market_prob >= 1.0 {
            return 0.0;
        }
        let p = self.model_prob;
        let q = 1.0 - p;
        let b = (1.0 / market_prob) - 1.0;
        if b <= 0.0 {
            return 0.0;
        }
        ((p * b - q) / b).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_pct_matches_model_minus_market() {
        let s = TradingSignal::new(
            "g1",
            Sport::NBA,
            "HOME",
            Direction::Buy,
            SignalType::ModelEdgeYes,
            0.74,
            Some(0.61),
            Some(Platform::Paper),
            Some(0.62),
            500.0,
            0.9,
        );
        assert!((s.edge_pct - 13.0).abs() < 1e-9);
    }

    #[test]
    fn kelly_fraction_zero_without_market_prob() {
        let s = TradingSignal::new(
            "g1",
            Sport::NBA,
            "HOME",
            Direction::Buy,
            SignalType::ModelEdgeYes,
            0.74,
            None,
            None,
            None,
            0.0,
            0.9,
        );
        assert_eq!(s.kelly_fraction(), 0.0);
    }

    #[test]
    fn arbitrage_is_risk_free() {
        assert!(SignalType::Arbitrage.is_risk_free());
        assert!(!SignalType::ModelEdgeYes.is_risk_free());
    }
}
