use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

const STALE_AFTER: Duration = Duration::minutes(5);

/// In-flight idempotency-key tracker (§4.5). A key already present means a
/// request for the same `(game_id, team, direction)` is still being acted
/// on; GC drops entries older than 5 minutes every sweep.
#[derive(Debug, Default)]
pub struct Dedup {
    in_flight: HashMap<String, DateTime<Utc>>,
}

impl Dedup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` and records the key if it wasn't already in flight.
    pub fn try_claim(&mut self, key: &str, now: DateTime<Utc>) -> bool {
        if self.in_flight.contains_key(key) {
            return false;
        }
        self.in_flight.insert(key.to_string(), now);
        true
    }

    pub fn gc(&mut self, now: DateTime<Utc>) {
        self.in_flight.retain(|_, seen_at| now.signed_duration_since(*seen_at) < STALE_AFTER);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_claim_of_same_key_fails() {
        let mut dedup = Dedup::new();
        let now = Utc::now();
        assert!(dedup.try_claim("k1", now));
        assert!(!dedup.try_claim("k1", now));
    }

    #[test]
    fn gc_drops_stale_entries() {
        let mut dedup = Dedup::new();
        let old = Utc::now() - Duration::minutes(10);
        dedup.try_claim("k1", old);
        dedup.gc(Utc::now());
        assert!(dedup.try_claim("k1", Utc::now()));
    }
}
