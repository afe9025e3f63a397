//! Ties together game discovery, shard assignment, and health supervision
//! (§4.3). Owns no game state itself; it only assigns games to shards and
//! watches their heartbeats.

mod assignment;
mod discovery_loop;
mod schedule;
mod supervision;

pub use assignment::ShardRegistry;
pub use schedule::ScheduleProvider;
pub use supervision::{Supervisor, SupervisorAction, SUPERVISABLE_SERVICES};

use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{error, warn};

use crate::discovery::MarketDiscoveryService;
use crate::domain::Sport;
use crate::messaging::{topics, HotBus};
use crate::shard::ShardHeartbeat;
use crate::store::Pool;

const HEARTBEAT_CHECK_INTERVAL: Duration = Duration::from_secs(10);
const MISS_THRESHOLD: u32 = 3;

pub struct Orchestrator {
    sports: Vec<Sport>,
    provider: ScheduleProvider,
    discovery: MarketDiscoveryService,
    bus: HotBus,
    pool: Pool,
    registry: Mutex<ShardRegistry>,
    supervisor: Mutex<Supervisor>,
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        sports: Vec<Sport>,
        provider: ScheduleProvider,
        discovery: MarketDiscoveryService,
        bus: HotBus,
        pool: Pool,
    ) -> Self {
        Self {
            sports,
            provider,
            discovery,
            bus,
            pool,
            registry: Mutex::new(ShardRegistry::new()),
            supervisor: Mutex::new(Supervisor::new(MISS_THRESHOLD)),
        }
    }

    pub async fn run(&self) {
        tokio::join!(
            self.run_discovery_loop(),
            self.run_heartbeat_listener(),
            self.run_supervision_loop(),
            self.discovery.run_team_match_rpc()
        );
    }

    async fn run_heartbeat_listener(&self) {
        let mut rx = self.bus.subscribe::<ShardHeartbeat>(topics::HEALTH_HEARTBEATS);
        while let Some(received) = rx.recv().await {
            self.registry.lock().await.record_heartbeat(&received.payload);
            self.supervisor.lock().await.record_healthy("game-shard");
        }
    }

    /// Watches for shards that have gone quiet and hands them to the
    /// supervisor's bounded-restart policy (§4.3).
    async fn run_supervision_loop(&self) {
        let mut interval = tokio::time::interval(HEARTBEAT_CHECK_INTERVAL);
        loop {
            interval.tick().await;
            let now = Utc::now();
            let unhealthy = self.registry.lock().await.unhealthy_shards(now);
            if unhealthy.is_empty() {
                continue;
            }
            let mut supervisor = self.supervisor.lock().await;
            for shard_id in unhealthy {
                match supervisor.record_miss("game-shard") {
                    SupervisorAction::None => {}
                    SupervisorAction::Restart { backoff, attempt } => {
                        warn!(shard_id, attempt, backoff_secs = backoff.as_secs(), "shard unresponsive, scheduling restart");
                    }
                    SupervisorAction::Cooldown => {
                        error!(shard_id, "shard restart attempts exhausted, alerting");
                    }
                }
            }
        }
    }
}
