use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sport {
    NFL,
    NBA,
    NHL,
    MLB,
    NCAAF,
    NCAAB,
    MLS,
    #[serde(rename = "SOCCER")]
    Soccer,
    Tennis,
    MMA,
}

impl Sport {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::NFL => "NFL",
            Sport::NBA => "NBA",
            Sport::NHL => "NHL",
            Sport::MLB => "MLB",
            Sport::NCAAF => "NCAAF",
            Sport::NCAAB => "NCAAB",
            Sport::MLS => "MLS",
            Sport::Soccer => "SOCCER",
            Sport::Tennis => "TENNIS",
            Sport::MMA => "MMA",
        }
    }

    /// Nominal regulation duration in seconds (§4.4 supplemental table).
    #[must_use]
    pub fn regulation_seconds(&self) -> u32 {
        match self {
            Sport::NFL | Sport::NCAAF => 3600,
            Sport::NBA => 2880,
            Sport::NCAAB => 2400,
            Sport::NHL => 3600,
            Sport::MLB => 32_400,
            Sport::MLS | Sport::Soccer => 5400,
            Sport::Tennis => 7200,
            Sport::MMA => 900,
        }
    }

    /// Last period of regulation; `period > this` means overtime. `None` for
    /// sports where "overtime" isn't a meaningful concept (Tennis, MMA).
    #[must_use]
    pub fn regulation_periods(&self) -> Option<u32> {
        match self {
            Sport::NHL => Some(3),
            Sport::NBA | Sport::NFL | Sport::NCAAF => Some(4),
            Sport::NCAAB | Sport::MLS | Sport::Soccer => Some(2),
            Sport::MLB => Some(9),
            Sport::Tennis | Sport::MMA => None,
        }
    }

    #[must_use]
    pub fn is_overtime(&self, period: u32) -> bool {
        matches!(self.regulation_periods(), Some(reg) if period > reg)
    }

    /// Conservative sport-specific stop-loss percentage (§4.7 supplemental,
    /// Open Question (b)). Expressed as a fraction, e.g. `0.03` for 3%.
    #[must_use]
    pub fn stop_loss_pct(&self) -> f64 {
        match self {
            Sport::NBA | Sport::NCAAB => 0.03,
            Sport::NFL | Sport::NCAAF => 0.05,
            Sport::NHL => 0.07,
            Sport::MLB => 0.06,
            Sport::MLS | Sport::Soccer => 0.07,
            Sport::Tennis => 0.04,
            Sport::MMA => 0.08,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Kalshi,
    Polymarket,
    Paper,
}

impl Platform {
    /// Round-trip fee as a fraction of notional, §4.5/§4.7. Paper mirrors Kalshi.
    #[must_use]
    pub fn round_trip_fee_pct(&self) -> f64 {
        match self {
            Platform::Kalshi | Platform::Paper => 0.014,
            Platform::Polymarket => 0.04,
        }
    }

    /// Per-side fee as a fraction of notional, §4.7 close accounting.
    #[must_use]
    pub fn per_side_fee_pct(&self) -> f64 {
        match self {
            Platform::Kalshi | Platform::Paper => 0.007,
            Platform::Polymarket => 0.02,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Yes,
    No,
}

impl Side {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Yes => "yes",
            Side::No => "no",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    #[must_use]
    pub fn side(&self) -> Side {
        match self {
            Direction::Buy => Side::Yes,
            Direction::Sell => Side::No,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Buy => "buy",
            Direction::Sell => "sell",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overtime_thresholds_match_per_sport_period_counts() {
        assert!(Sport::NHL.is_overtime(4));
        assert!(!Sport::NHL.is_overtime(3));
        assert!(Sport::NBA.is_overtime(5));
        assert!(!Sport::NBA.is_overtime(4));
        assert!(Sport::NCAAB.is_overtime(3));
        assert!(!Sport::Tennis.is_overtime(99));
        assert!(!Sport::MMA.is_overtime(99));
    }

    #[test]
    fn fee_rates_match_spec_table() {
        assert!((Platform::Kalshi.round_trip_fee_pct() - 0.014).abs() < 1e-9);
        assert!((Platform::Polymarket.round_trip_fee_pct() - 0.04).abs() < 1e-9);
        assert!((Platform::Kalshi.per_side_fee_pct() - 0.007).abs() < 1e-9);
        assert!((Platform::Polymarket.per_side_fee_pct() - 0.02).abs() < 1e-9);
    }
}
