use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// Integer-cents money, per §9's "never compare money with floating-point
/// equality" design note. All PnL/fee arithmetic lands here at the boundary.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cents(pub i64);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    /// Convert a `[0,1]` probability/price into cents of a dollar notional.
    #[must_use]
    pub fn from_price_and_size(price: f64, size: f64) -> Self {
        let notional = Decimal::try_from(price * size).unwrap_or_default();
        Self::from_decimal_dollars(notional)
    }

    #[must_use]
    pub fn from_decimal_dollars(dollars: Decimal) -> Self {
        let cents = (dollars * Decimal::from(100)).round();
        Cents(cents.try_into().unwrap_or(0))
    }

    #[must_use]
    pub fn from_fraction_of(fraction: f64, of: Cents) -> Self {
        let scaled = Decimal::try_from(fraction).unwrap_or_default() * Decimal::from(of.0);
        Cents(scaled.round().try_into().unwrap_or(0))
    }

    #[must_use]
    pub fn as_dollars(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Add for Cents {
    type Output = Cents;
    fn add(self, rhs: Cents) -> Cents {
        Cents(self.0 + rhs.0)
    }
}

impl Sub for Cents {
    type Output = Cents;
    fn sub(self, rhs: Cents) -> Cents {
        Cents(self.0 - rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_price_and_size_rounds_to_nearest_cent() {
        let c = Cents::from_price_and_size(0.62, 100.0);
        assert_eq!(c.0, 6200);
    }

    #[test]
    fn fraction_of_rounds_correctly() {
        let base = Cents(10_000);
        let half = Cents::from_fraction_of(0.5, base);
        assert_eq!(half.0, 5_000);
    }

    #[test]
    fn arithmetic_has_no_float_residue() {
        let a = Cents::from_price_and_size(0.1, 300.0);
        let b = Cents::from_price_and_size(0.2, 300.0);
        assert_eq!((a + b).0, 9_000);
    }
}
