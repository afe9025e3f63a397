use std::collections::HashMap;
use std::time::Duration;

use tracing::{error, warn};

const RESTART_BACKOFFS_SECS: [u64; 3] = [5, 15, 45];
const MAX_RESTART_ATTEMPTS: u32 = 3;

/// Stateless services the supervisor is allowed to restart. Stateful
/// services (store, bus, the orchestrator itself) are never in this list
/// (§4.3).
pub const SUPERVISABLE_SERVICES: &[&str] = &["game-shard", "signal-processor", "execution", "observer"];

#[derive(Debug, Default)]
struct RestartState {
    consecutive_misses: u32,
    attempts: u32,
    in_cooldown: bool,
}

/// Bounded auto-restart policy (§4.3): on >= N consecutive missed
/// heartbeats, attempt restart with exponential backoff up to K attempts,
/// then cooldown and alert.
#[derive(Default)]
pub struct Supervisor {
    state: HashMap<String, RestartState>,
    miss_threshold: u32,
}

pub enum SupervisorAction {
    None,
    Restart { backoff: Duration, attempt: u32 },
    Cooldown,
}

impl Supervisor {
    #[must_use]
    pub fn new(miss_threshold: u32) -> Self {
        Self { state: HashMap::new(), miss_threshold }
    }

    pub fn record_miss(&mut self, service: &str) -> SupervisorAction {
        if !SUPERVISABLE_SERVICES.contains(&service) {
            return SupervisorAction::None;
        }
        let entry = self.state.entry(service.to_string()).or_default();
        if entry.in_cooldown {
            return SupervisorAction::None;
        }
        entry.consecutive_misses += 1;
        if entry.consecutive_misses < self.miss_threshold {
            return SupervisorAction::None;
        }
        entry.consecutive_misses = 0;
        if entry.attempts >= MAX_RESTART_ATTEMPTS {
            entry.in_cooldown = true;
            error!(service, "restart attempts exhausted, entering cooldown");
            return SupervisorAction::Cooldown;
        }
        let backoff_secs = RESTART_BACKOFFS_SECS[entry.attempts as usize % RESTART_BACKOFFS_SECS.len()];
        entry.attempts += 1;
        warn!(service, attempt = entry.attempts, backoff_secs, "attempting supervised restart");
        SupervisorAction::Restart { backoff: Duration::from_secs(backoff_secs), attempt: entry.attempts }
    }

    pub fn record_healthy(&mut self, service: &str) {
        if let Some(entry) = self.state.get_mut(service) {
            entry.consecutive_misses = 0;
            entry.attempts = 0;
            entry.in_cooldown = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stateful_services_are_never_supervised() {
        let mut supervisor = Supervisor::new(2);
        for _ in 0..5 {
            assert!(matches!(supervisor.record_miss("store"), SupervisorAction::None));
        }
    }

    #[test]
    fn exhausting_attempts_enters_cooldown() {
        let mut supervisor = Supervisor::new(1);
        for _ in 0..MAX_RESTART_ATTEMPTS {
            assert!(matches!(supervisor.record_miss("game-shard"), SupervisorAction::Restart { .. }));
        }
        assert!(matches!(supervisor.record_miss("game-shard"), SupervisorAction::Cooldown));
    }
}
