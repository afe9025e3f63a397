use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Cents;

/// Single logical row (§3, §9): never cached beyond the last-seen `version`,
/// every update goes through the store's CAS path (`store::bankroll`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bankroll {
    pub current_balance: Cents,
    pub piggybank_balance: Cents,
    pub peak_balance: Cents,
    pub trough_balance: Cents,
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

impl Bankroll {
    #[must_use]
    pub fn initial(starting_balance: Cents) -> Self {
        Self {
            current_balance: starting_balance,
            piggybank_balance: Cents::ZERO,
            peak_balance: starting_balance,
            trough_balance: starting_balance,
            version: 0,
            updated_at: Utc::now(),
        }
    }

    /// Apply half of net profit to the piggybank, half to current balance
    /// (§4.7). Losses are taken entirely from current balance.
    #[must_use]
    pub fn apply_net(&self, net: Cents) -> Bankroll {
        let mut next = self.clone();
        if net.0 > 0 {
            let half = Cents(net.0 / 2);
            let remainder = net - half;
            next.piggybank_balance = next.piggybank_balance + half;
            next.current_balance = next.current_balance + remainder;
        } else {
            next.current_balance = next.current_balance + net;
        }
        if next.current_balance > next.peak_balance {
            next.peak_balance = next.current_balance;
        }
        if next.current_balance < next.trough_balance {
            next.trough_balance = next.current_balance;
        }
        next.version += 1;
        next.updated_at = Utc::now();
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_net_splits_profit_evenly() {
        let b = Bankroll::initial(Cents(100_000));
        let after = b.apply_net(Cents(1_000));
        assert_eq!(after.piggybank_balance.0, 500);
        assert_eq!(after.current_balance.0, 100_500);
        assert_eq!(after.version, 1);
    }

    #[test]
    fn apply_net_takes_losses_entirely_from_current() {
        let b = Bankroll::initial(Cents(100_000));
        let after = b.apply_net(Cents(-1_000));
        assert_eq!(after.piggybank_balance.0, 0);
        assert_eq!(after.current_balance.0, 99_000);
        assert_eq!(after.trough_balance.0, 99_000);
    }
}
