use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::domain::Platform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Closed,
    Open,
    HalfOpen,
}

struct VenueState {
    state: State,
    consecutive_failures: u32,
    transitioned_at: Instant,
}

impl VenueState {
    fn new() -> Self {
        Self {
            state: State::Closed,
            consecutive_failures: 0,
            transitioned_at: Instant::now(),
        }
    }
}

/// Per-venue circuit breaker (§4.6): opens after `failure_threshold`
/// consecutive failures, allows a trial request after `half_open_after`,
/// and requires `reset_after` of unbroken success in the half-open state
/// before fully resetting the failure count.
pub struct CircuitBreaker {
    venues: Mutex<HashMap<Platform, VenueState>>,
    failure_threshold: u32,
    half_open_after: Duration,
    reset_after: Duration,
}

impl CircuitBreaker {
    #[must_use]
    pub fn new(failure_threshold: u32, half_open_after: Duration, reset_after: Duration) -> Self {
        Self {
            venues: Mutex::new(HashMap::new()),
            failure_threshold,
            half_open_after,
            reset_after,
        }
    }

    /// Whether a request to `venue` may proceed. Transitions Open -> HalfOpen
    /// as a side effect once the half-open window has elapsed.
    pub fn allow(&self, venue: Platform) -> bool {
        let mut venues = self.venues.lock();
        let entry = venues.entry(venue).or_insert_with(VenueState::new);
        match entry.state {
            State::Closed | State::HalfOpen => true,
            State::Open => {
                if entry.transitioned_at.elapsed() >= self.half_open_after {
                    entry.state = State::HalfOpen;
                    entry.transitioned_at = Instant::now();
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self, venue: Platform) {
        let mut venues = self.venues.lock();
        let entry = venues.entry(venue).or_insert_with(VenueState::new);
        match entry.state {
            State::Closed => entry.consecutive_failures = 0,
            State::HalfOpen => {
                if entry.transitioned_at.elapsed() >= self.reset_after {
                    entry.state = State::Closed;
                    entry.consecutive_failures = 0;
                    entry.transitioned_at = Instant::now();
                }
            }
            State::Open => {}
        }
    }

    pub fn record_failure(&self, venue: Platform) {
        let mut venues = self.venues.lock();
        let entry = venues.entry(venue).or_insert_with(VenueState::new);
        match entry.state {
            State::HalfOpen => {
                entry.state = State::Open;
                entry.transitioned_at = Instant::now();
            }
            State::Closed => {
                entry.consecutive_failures += 1;
                if entry.consecutive_failures >= self.failure_threshold {
                    entry.state = State::Open;
                    entry.transitioned_at = Instant::now();
                }
            }
            State::Open => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_after_threshold_failures() {
        let cb = CircuitBreaker::new(3, Duration::from_secs(60), Duration::from_secs(300));
        assert!(cb.allow(Platform::Kalshi));
        cb.record_failure(Platform::Kalshi);
        cb.record_failure(Platform::Kalshi);
        assert!(cb.allow(Platform::Kalshi));
        cb.record_failure(Platform::Kalshi);
        assert!(!cb.allow(Platform::Kalshi));
    }

    #[test]
    fn half_open_allows_a_trial_after_window() {
        let cb = CircuitBreaker::new(1, Duration::from_millis(0), Duration::from_secs(300));
        cb.record_failure(Platform::Kalshi);
        // half_open_after is 0, so the very next check transitions Open -> HalfOpen.
        assert!(cb.allow(Platform::Kalshi));
    }

    #[test]
    fn success_in_closed_state_resets_failure_count() {
        let cb = CircuitBreaker::new(3, Duration::from_secs(60), Duration::from_secs(300));
        cb.record_failure(Platform::Kalshi);
        cb.record_failure(Platform::Kalshi);
        cb.record_success(Platform::Kalshi);
        cb.record_failure(Platform::Kalshi);
        cb.record_failure(Platform::Kalshi);
        assert!(cb.allow(Platform::Kalshi));
    }

    #[test]
    fn failure_during_half_open_reopens_immediately() {
        let cb = CircuitBreaker::new(1, Duration::from_millis(0), Duration::from_secs(300));
        cb.record_failure(Platform::Kalshi);
        assert!(cb.allow(Platform::Kalshi));
        cb.record_failure(Platform::Kalshi);
        assert!(!cb.allow(Platform::Kalshi));
    }

    #[test]
    fn separate_venues_are_independent() {
        let cb = CircuitBreaker::new(1, Duration::from_secs(60), Duration::from_secs(300));
        cb.record_failure(Platform::Kalshi);
        assert!(!cb.allow(Platform::Kalshi));
        assert!(cb.allow(Platform::Polymarket));
    }
}
