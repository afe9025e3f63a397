use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::domain::ExecutionResult;

const STALE_AFTER_SECS: i64 = 600;

/// Process-local cache of recently-seen `request_id`s (§4.6 supplemental):
/// a redelivered request returns the original result instead of
/// re-executing against the venue.
pub struct IdempotencyCache {
    seen: DashMap<String, (ExecutionResult, DateTime<Utc>)>,
}

impl IdempotencyCache {
    #[must_use]
    pub fn new() -> Self {
        Self { seen: DashMap::new() }
    }

    #[must_use]
    pub fn check(&self, request_id: &str) -> Option<ExecutionResult> {
        self.seen.get(request_id).map(|entry| entry.0.clone())
    }

    pub fn record(&self, request_id: &str, result: ExecutionResult) {
        self.seen.insert(request_id.to_string(), (result, Utc::now()));
    }

    pub fn gc(&self, now: DateTime<Utc>) {
        self.seen
            .retain(|_, (_, seen_at)| now.signed_duration_since(*seen_at).num_seconds() < STALE_AFTER_SECS);
    }
}

impl Default for IdempotencyCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExecutionStatus, Platform, Side};

    fn result(request_id: &str) -> ExecutionResult {
        ExecutionResult {
            request_id: request_id.to_string(),
            idempotency_key: "g1:LAL:buy".into(),
            status: ExecutionStatus::Filled,
            order_id: Some("o1".into()),
            filled_qty: 100.0,
            avg_price: 0.60,
            entry_fees: crate::domain::Cents(70),
            error: None,
            platform: Platform::Paper,
            game_id: "g1".into(),
            contract_team: "LAL".into(),
            side: Side::Yes,
            requested_at: Utc::now(),
            executed_at: Utc::now(),
            latency_ms: 0.0,
        }
    }

    #[test]
    fn returns_cached_result_for_known_request_id() {
        let cache = IdempotencyCache::new();
        assert!(cache.check("r1").is_none());
        cache.record("r1", result("r1"));
        assert!(cache.check("r1").is_some());
    }

    #[test]
    fn gc_drops_entries_older_than_the_stale_window() {
        let cache = IdempotencyCache::new();
        cache.record("r1", result("r1"));
        cache.gc(Utc::now() + chrono::Duration::seconds(STALE_AFTER_SECS + 1));
        assert!(cache.check("r1").is_none());
    }
}
