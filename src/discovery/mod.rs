//! Market discovery RPC service (§4.2): resolves (sport, home, away) to
//! per-platform market ids via fuzzy team matching, and answers a
//! request/response team-match RPC over the hot plane.

mod kalshi;
mod polymarket;
mod rpc;
mod team_match;

pub use rpc::{MarketLookupRequest, MarketLookupResponse, TeamMatchRequest, TeamMatchResponse};
pub use team_match::{score_match, MatchMethod, TeamMatch};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::{Platform, Sport};
use crate::error::Result;
use crate::messaging::{topics, HotBus};

const MARKET_CACHE_TTL: Duration = Duration::from_secs(300);
const AGGRESSIVE_REFRESH_TTL: Duration = Duration::from_secs(30);
const MIN_MATCH_CONFIDENCE: f64 = 0.7;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MarketIds {
    pub platform: Platform,
    pub market_id: String,
    pub contract_team: String,
}

struct CacheEntry {
    markets: Vec<MarketIds>,
    fetched_at: Instant,
}

/// In-memory (game -> per-platform market id) cache, refreshed on a TTL
/// per sport, grounded on the teacher's `MarketCache` shape.
pub struct MarketDiscoveryService {
    bus: HotBus,
    cache: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl MarketDiscoveryService {
    #[must_use]
    pub fn new(bus: HotBus) -> Self {
        Self {
            bus,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Serves the team-match RPC forever; intended to be spawned as its own
    /// task alongside the market-lookup loop.
    pub async fn run_team_match_rpc(&self) {
        let mut rx = self
            .bus
            .subscribe::<TeamMatchRequest>(topics::TEAM_MATCH_REQUEST);
        while let Some(received) = rx.recv().await {
            let req = received.payload;
            let result = team_match::score_match(&req.target_team, &req.candidate_team, req.sport);
            let response = TeamMatchResponse {
                request_id: req.request_id.clone(),
                is_match: result.confidence >= MIN_MATCH_CONFIDENCE,
                confidence: result.confidence,
                method: result.method,
            };
            let topic = topics::team_match_response(&req.request_id);
            if let Err(e) = self.bus.publish(&topic, &response).await {
                debug!(error = %e, "failed to publish team match response");
            }
        }
    }

    /// Resolves (sport, home, away) to per-platform market ids, refreshing
    /// the cache per §4.2's TTL policy: 5 minute normal TTL, 30 second
    /// aggressive refresh when nothing is cached for a live series yet.
    pub async fn find_moneyline_markets(
        &self,
        sport: Sport,
        home_team: &str,
        away_team: &str,
    ) -> Result<Vec<MarketIds>> {
        let cache_key = format!("{}:{}:{}", sport.as_str(), home_team, away_team);

        if let Some(entry) = self.cache.read().await.get(&cache_key) {
            let ttl = if entry.markets.is_empty() {
                AGGRESSIVE_REFRESH_TTL
            } else {
                MARKET_CACHE_TTL
            };
            if entry.fetched_at.elapsed() < ttl {
                return Ok(entry.markets.clone());
            }
        }

        let mut found = Vec::new();
        found.extend(
            kalshi::find_moneyline_market(sport, home_team, away_team, MIN_MATCH_CONFIDENCE).await?,
        );
        found.extend(
            polymarket::find_moneyline_market(sport, home_team, away_team, MIN_MATCH_CONFIDENCE)
                .await?,
        );

        info!(
            sport = sport.as_str(),
            home_team, away_team, found = found.len(), "market discovery refreshed"
        );

        self.cache.write().await.insert(
            cache_key,
            CacheEntry {
                markets: found.clone(),
                fetched_at: Instant::now(),
            },
        );
        Ok(found)
    }
}
