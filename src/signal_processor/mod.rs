//! Transforms a `TradingSignal` into zero or one `ExecutionRequest`,
//! enforcing pre-trade filters, parallel risk checks, and Kelly sizing
//! (§4.5).

mod dedup;
mod filters;
mod risk;
mod rules;
mod sizing;

pub use dedup::Dedup;
pub use filters::CooldownMap;

use std::collections::HashMap;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::discovery::{score_match, MarketDiscoveryService};
use crate::domain::{ExecutionRequest, Platform, TradeClosedEvent, TradingRule, TradingSignal};
use crate::error::Result;
use crate::messaging::{topics, HotBus};
use crate::store::{self, Pool};

const DEDUP_GC_INTERVAL: StdDuration = StdDuration::from_secs(60);
const MIN_MARKET_MATCH_CONFIDENCE: f64 = 0.6;

/// Why a signal or request didn't make it to the execution service (§4.5).
#[derive(Debug, Clone)]
pub enum RejectReason {
    NoMarket,
    EdgeTooSmall,
    ProbabilityOutOfBounds,
    DuplicatePosition,
    Cooldown,
    RuleRejected(String),
    BelowOverrideEdge(String),
    InsufficientBalance,
    DailyLossExceeded,
    GameExposureExceeded,
    SportExposureExceeded,
    OpposingPosition,
    TooManyOpenPositions,
    InsufficientLiquidity,
    NoMarketMatch,
    InFlightDuplicate,
}

impl RejectReason {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            RejectReason::NoMarket => "no_market",
            RejectReason::EdgeTooSmall => "edge",
            RejectReason::ProbabilityOutOfBounds => "prob",
            RejectReason::DuplicatePosition => "duplicate",
            RejectReason::Cooldown => "cooldown",
            RejectReason::RuleRejected(_) | RejectReason::BelowOverrideEdge(_) => "rule_blocked",
            RejectReason::InsufficientBalance => "risk_balance",
            RejectReason::DailyLossExceeded => "risk_daily_loss",
            RejectReason::GameExposureExceeded => "risk_game_exposure",
            RejectReason::SportExposureExceeded => "risk_sport_exposure",
            RejectReason::OpposingPosition => "risk_opposing",
            RejectReason::TooManyOpenPositions => "risk_open_count",
            RejectReason::InsufficientLiquidity => "risk_liquidity",
            RejectReason::NoMarketMatch => "no_market_match",
            RejectReason::InFlightDuplicate => "in_flight_duplicate",
        }
    }
}

/// Owns the filter/risk/sizing pipeline state: cooldowns, in-flight dedup
/// map, and the cached active rule set (§4.5).
pub struct SignalProcessor {
    config: Config,
    pool: Pool,
    bus: HotBus,
    discovery: MarketDiscoveryService,
    cooldowns: Mutex<CooldownMap>,
    dedup: Mutex<Dedup>,
    rules: RwLock<Vec<TradingRule>>,
    rejected_counts: Mutex<HashMap<&'static str, u64>>,
}

impl SignalProcessor {
    #[must_use]
    pub fn new(config: Config, pool: Pool, bus: HotBus) -> Self {
        let discovery = MarketDiscoveryService::new(bus.clone());
        Self {
            config,
            pool,
            bus,
            discovery,
            cooldowns: Mutex::new(CooldownMap::new()),
            dedup: Mutex::new(Dedup::new()),
            rules: RwLock::new(Vec::new()),
            rejected_counts: Mutex::new(HashMap::new()),
        }
    }

    pub async fn run(&self) {
        if let Err(e) = self.reload_rules().await {
            warn!(error = %e, "initial rule load failed, starting with an empty rule set");
        }
        tokio::join!(
            self.run_signal_loop(),
            self.run_rule_reload_loop(),
            self.run_trade_event_loop(),
            self.run_dedup_gc_loop(),
        );
    }

    async fn reload_rules(&self) -> Result<()> {
        let rules = store::load_active_rules(&self.pool).await?;
        info!(count = rules.len(), "loaded active trading rules");
        *self.rules.write().await = rules;
        Ok(())
    }

    async fn run_rule_reload_loop(&self) {
        let mut rx = self.bus.subscribe::<serde_json::Value>(topics::FEEDBACK_RULES);
        while rx.recv().await.is_some() {
            if let Err(e) = self.reload_rules().await {
                warn!(error = %e, "failed to reload rules after feedback:rules update");
            }
        }
    }

    /// Tracks per-team cooldowns from position-tracker close events (§4.5).
    async fn run_trade_event_loop(&self) {
        let mut rx = self.bus.subscribe::<TradeClosedEvent>(topics::TRADES);
        while let Some(received) = rx.recv().await {
            let event = received.payload;
            self.cooldowns
                .lock()
                .await
                .insert((event.game_id, event.team), (event.closed_at, event.won));
        }
    }

    async fn run_dedup_gc_loop(&self) {
        let mut interval = tokio::time::interval(DEDUP_GC_INTERVAL);
        loop {
            interval.tick().await;
            self.dedup.lock().await.gc(Utc::now());
        }
    }

    async fn run_signal_loop(&self) {
        let mut rx = self.bus.subscribe::<TradingSignal>(topics::SIGNALS_TRADE);
        while let Some(received) = rx.recv().await {
            if let Err(e) = self.handle_signal(received.payload).await {
                warn!(error = %e, "failed to handle trading signal");
            }
        }
    }

    async fn record_rejection(&self, signal: &TradingSignal, reason: &RejectReason) {
        *self.rejected_counts.lock().await.entry(reason.label()).or_insert(0) += 1;
        let snapshot = serde_json::json!({
            "kind": "signal_rejected",
            "signal_id": signal.signal_id,
            "game_id": signal.game_id,
            "team": signal.team,
            "reason": reason.label(),
        });
        if let Err(e) = self.bus.publish(topics::NOTIFICATION_EVENTS, &snapshot).await {
            debug!(error = %e, "failed to publish rejection notification");
        }
        debug!(game_id = %signal.game_id, team = %signal.team, reason = reason.label(), "signal rejected");
    }

    /// Runs the full pipeline for one signal: filters, risk checks, market
    /// resolution, sizing, dedup, and (on success) publishes an
    /// `ExecutionRequest` on `execution.request.{request_id}` (§4.5).
    async fn handle_signal(&self, signal: TradingSignal) -> Result<()> {
        let now = Utc::now();
        if signal.is_expired(now) {
            return Ok(());
        }

        let existing_same_team = store::open_position_for_team(&self.pool, &signal.game_id, &signal.team).await?;

        let rules = self.rules.read().await.clone();
        let cooldowns = self.cooldowns.lock().await.clone();
        if let Err(reason) = filters::apply_filters(
            &signal,
            &self.config.edge,
            Duration::seconds(self.config.risk.win_cooldown_seconds as i64),
            Duration::seconds(self.config.risk.loss_cooldown_seconds as i64),
            &cooldowns,
            existing_same_team.as_ref(),
            &rules,
            now,
        ) {
            self.record_rejection(&signal, &reason).await;
            return Ok(());
        }

        let bankroll = store::load_bankroll(&self.pool).await?;
        let venue = signal.platform_buy.unwrap_or(Platform::Paper);
        let stake_dollars = sizing::size_position(&signal, &self.config.edge, &self.config.liquidity, &bankroll, venue);
        let proposed_cost = sizing::notional_cents(stake_dollars);

        let risk_outcome = risk::run_risk_checks(
            &self.pool,
            &self.config.risk,
            &self.config.liquidity,
            risk::RiskInputs {
                signal: &signal,
                proposed_cost,
                bankroll: &bankroll,
                existing_same_team: existing_same_team.as_ref(),
            },
        )
        .await?;
        if let Err(reason) = risk_outcome {
            self.record_rejection(&signal, &reason).await;
            return Ok(());
        }

        let Some((market_id, contract_team)) = self.resolve_market(&signal, venue).await? else {
            self.record_rejection(&signal, &RejectReason::NoMarketMatch).await;
            return Ok(());
        };

        let limit_price = signal.buy_price.unwrap_or(signal.market_prob.unwrap_or(0.5));
        let idempotency_key = crate::domain::idempotency_key(&signal.game_id, &signal.team, signal.direction);
        if !self.dedup.lock().await.try_claim(&idempotency_key, now) {
            self.record_rejection(&signal, &RejectReason::InFlightDuplicate).await;
            return Ok(());
        }

        let request = ExecutionRequest {
            request_id: uuid::Uuid::new_v4().to_string(),
            idempotency_key,
            game_id: signal.game_id.clone(),
            sport: signal.sport,
            signal_id: signal.signal_id.clone(),
            platform: venue,
            market_id,
            contract_team,
            side: signal.direction.side(),
            action: crate::domain::Direction::Buy,
            limit_price,
            size: sizing::contract_count(stake_dollars, limit_price),
            edge_pct: signal.edge_pct,
            model_prob: signal.model_prob,
            market_prob: signal.market_prob,
            created_at: now,
        };

        let topic = topics::execution_request(&request.request_id);
        self.bus.publish(&topic, &request).await?;
        info!(request_id = %request.request_id, game_id = %signal.game_id, team = %signal.team, "emitted execution request");
        Ok(())
    }

    /// Resolves the venue market id + exact contract team name for this
    /// signal's team via the discovery cache (§4.2).
    async fn resolve_market(&self, signal: &TradingSignal, venue: Platform) -> Result<Option<(String, String)>> {
        let Some(game) = store::get_game(&self.pool, &signal.game_id).await? else {
            return Ok(None);
        };
        let markets = self
            .discovery
            .find_moneyline_markets(signal.sport, &game.home_team, &game.away_team)
            .await?;

        let best = markets
            .iter()
            .filter(|m| m.platform == venue)
            .map(|m| (m, score_match(&signal.team, &m.contract_team, signal.sport)))
            .filter(|(_, m)| m.confidence >= MIN_MARKET_MATCH_CONFIDENCE)
            .max_by(|(_, a), (_, b)| a.confidence.partial_cmp(&b.confidence).unwrap_or(std::cmp::Ordering::Equal));

        Ok(best.map(|(m, _)| (m.market_id.clone(), m.contract_team.clone())))
    }
}
