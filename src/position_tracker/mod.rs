//! Owns open positions end to end (§4.7): opens on execution fill, tracks
//! exit conditions against live prices, settles on game-terminal state, and
//! runs the orphan sweep safety net. Every close applies the bankroll CAS
//! update and publishes a `TradeClosedEvent` for the signal processor's
//! per-team cooldown.

mod exits;
mod settlement;

pub use exits::ExitReason;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::domain::{
    AuditOp, AuditRecord, Cents, Direction, ExecutionRequest, ExecutionResult, ExecutionStatus,
    MarketPrice, OpenPosition, TradeClosedEvent,
};
use crate::error::Result;
use crate::messaging::{topics, HotBus};
use crate::shard::PriceListenerStats;
use crate::store::{self, Pool};

const ORPHAN_SWEEP_INTERVAL: StdDuration = StdDuration::from_secs(300);
const HEARTBEAT_INTERVAL: StdDuration = StdDuration::from_secs(10);

/// Submitted exit orders, keyed by the `ExecutionRequest.request_id` that
/// will close them, so the matching `ExecutionResult` can be routed back to
/// the position it closes (§4.7: a fill only carries the request it
/// answers, not the trade).
type PendingExits = DashMap<String, String>;

pub struct PositionTracker {
    instance_id: String,
    config: Config,
    bus: HotBus,
    pool: Pool,
    positions: Mutex<HashMap<String, OpenPosition>>,
    prices: Mutex<HashMap<(String, String), MarketPrice>>,
    pending_exits: PendingExits,
    stats: Arc<PriceListenerStats>,
    positions_opened: AtomicU64,
    positions_closed: AtomicU64,
}

impl PositionTracker {
    pub async fn new(instance_id: impl Into<String>, config: Config, bus: HotBus, pool: Pool) -> Result<Self> {
        let open = store::load_open_positions(&pool).await?;
        info!(count = open.len(), "rehydrated open positions from store");
        let positions = open.into_iter().map(|p| (p.trade_id.clone(), p)).collect();
        Ok(Self {
            instance_id: instance_id.into(),
            config,
            bus,
            pool,
            positions: Mutex::new(positions),
            prices: Mutex::new(HashMap::new()),
            pending_exits: DashMap::new(),
            stats: Arc::new(PriceListenerStats::default()),
            positions_opened: AtomicU64::new(0),
            positions_closed: AtomicU64::new(0),
        })
    }

    pub async fn run(self: Arc<Self>) {
        tokio::join!(
            self.clone().run_price_ingest_loop(),
            self.clone().run_execution_result_loop(),
            self.clone().run_exit_check_loop(),
            self.clone().run_settlement_loop(),
            self.clone().run_orphan_sweep_loop(),
            self.clone().run_heartbeat_loop(),
        );
    }

    // -- price ingest ----------------------------------------------------

    async fn run_price_ingest_loop(self: Arc<Self>) {
        let mut rx = self.bus.subscribe::<MarketPrice>("prices.*");
        while let Some(received) = rx.recv().await {
            self.stats.record_received();
            let price = received.payload;
            let mut prices = self.prices.lock().await;
            prices.insert((price.game_id.clone(), price.contract_team.clone()), price);
            drop(prices);
            self.stats.record_processed();
        }
    }

    // -- execution result handling ----------------------------------------

    async fn run_execution_result_loop(self: Arc<Self>) {
        let mut rx = self.bus.subscribe::<ExecutionResult>("execution.result.*");
        while let Some(received) = rx.recv().await {
            if let Err(e) = self.handle_execution_result(received.payload).await {
                warn!(error = %e, "failed to handle execution result");
            }
        }
    }

    async fn handle_execution_result(&self, result: ExecutionResult) -> Result<()> {
        match result.action {
            Direction::Buy => self.handle_entry_fill(result).await,
            Direction::Sell => self.handle_exit_fill(result).await,
        }
    }

    async fn handle_entry_fill(&self, result: ExecutionResult) -> Result<()> {
        if !matches!(result.status, ExecutionStatus::Filled | ExecutionStatus::Partial) {
            return Ok(());
        }
        let Some(game) = store::get_game(&self.pool, &result.game_id).await? else {
            warn!(game_id = %result.game_id, "execution result for unknown game, dropping");
            return Ok(());
        };
        let position = OpenPosition::open(
            result.request_id.clone(),
            result.game_id.clone(),
            game.sport,
            result.contract_team.clone(),
            result.side,
            result.platform,
            result.market_id.clone(),
            result.avg_price,
            result.filled_qty,
            result.entry_fees,
        );
        store::insert_open_position(&self.pool, &position).await?;
        store::record_audit(
            &self.pool,
            &AuditRecord::new(AuditOp::TradeOpened, None, Some(serde_json::to_value(&position)?)),
        )
        .await?;
        info!(
            trade_id = %position.trade_id,
            game_id = %position.game_id,
            team = %position.team,
            entry_price = position.entry_price,
            "opened position"
        );
        self.positions_opened.fetch_add(1, Ordering::Relaxed);
        self.positions.lock().await.insert(position.trade_id.clone(), position);
        Ok(())
    }

    async fn handle_exit_fill(&self, result: ExecutionResult) -> Result<()> {
        let Some((_, trade_id)) = self.pending_exits.remove(&result.request_id) else {
            warn!(request_id = %result.request_id, "exit fill with no pending exit, dropping");
            return Ok(());
        };
        if !matches!(result.status, ExecutionStatus::Filled | ExecutionStatus::Partial) {
            warn!(trade_id, status = ?result.status, "exit order did not fill, position remains open");
            return Ok(());
        }
        let position = self.positions.lock().await.get(&trade_id).cloned();
        let Some(position) = position else {
            return Ok(());
        };
        self.finish_close(position, result.avg_price, false, AuditOp::TradeClosed).await
    }

    // -- exit condition checks --------------------------------------------

    async fn run_exit_check_loop(self: Arc<Self>) {
        let mut interval = tokio::time::interval(StdDuration::from_secs(
            self.config.polling.exit_check_interval_secs,
        ));
        loop {
            interval.tick().await;
            self.check_exits().await;
        }
    }

    async fn check_exits(&self) {
        let now = Utc::now();
        let ttl = chrono::Duration::seconds(self.config.freshness.price_staleness_ttl_secs as i64);
        let to_exit: Vec<(OpenPosition, f64, ExitReason)> = {
            let positions = self.positions.lock().await;
            let prices = self.prices.lock().await;
            positions
                .values()
                .filter_map(|position| {
                    let price = prices.get(&(position.game_id.clone(), position.team.clone()))?;
                    if !price.is_fresh(ttl, now) || price.is_pathological() || price.spread() > 0.5 {
                        return None;
                    }
                    exits::check_exit(position, price, &self.config.polling, now)
                        .map(|(exit_price, reason)| (position.clone(), exit_price, reason))
                })
                .collect()
        };
        for (position, exit_price, reason) in to_exit {
            if let Err(e) = self.submit_exit(&position, exit_price, reason).await {
                warn!(trade_id = %position.trade_id, error = %e, "failed to submit exit order");
            }
        }
    }

    async fn submit_exit(&self, position: &OpenPosition, exit_price: f64, reason: ExitReason) -> Result<()> {
        if self.pending_exits.iter().any(|e| e.value() == &position.trade_id) {
            return Ok(());
        }
        let request_id = Uuid::new_v4().to_string();
        let request = ExecutionRequest {
            request_id: request_id.clone(),
            idempotency_key: format!("{}:exit:{request_id}", position.trade_id),
            game_id: position.game_id.clone(),
            sport: position.sport,
            signal_id: format!("exit:{}", reason.label()),
            platform: position.platform,
            market_id: position.market_id.clone(),
            contract_team: position.team.clone(),
            side: position.side,
            action: Direction::Sell,
            limit_price: exit_price,
            size: position.size,
            edge_pct: 0.0,
            model_prob: exit_price,
            market_prob: Some(exit_price),
            created_at: Utc::now(),
        };
        self.pending_exits.insert(request_id.clone(), position.trade_id.clone());
        let topic = topics::execution_request(&request_id);
        self.bus.publish(&topic, &request).await?;
        info!(
            trade_id = %position.trade_id,
            reason = reason.label(),
            exit_price,
            "submitted exit order"
        );
        Ok(())
    }

    // -- settlement --------------------------------------------------------

    async fn run_settlement_loop(self: Arc<Self>) {
        let mut interval = tokio::time::interval(StdDuration::from_secs(
            self.config.polling.exit_check_interval_secs,
        ));
        loop {
            interval.tick().await;
            let positions: Vec<OpenPosition> = self.positions.lock().await.values().cloned().collect();
            if positions.is_empty() {
                continue;
            }
            let game_ids: Vec<String> = positions.iter().map(|p| p.game_id.clone()).collect();
            match store::games_in_terminal_state(&self.pool, &game_ids).await {
                Ok(terminal) => {
                    let terminal_ids: std::collections::HashSet<_> =
                        terminal.into_iter().map(|g| g.game_id).collect();
                    let to_settle: Vec<_> = positions
                        .into_iter()
                        .filter(|p| terminal_ids.contains(&p.game_id))
                        .collect();
                    self.settle_positions(to_settle, AuditOp::TradeSettled).await;
                }
                Err(e) => warn!(error = %e, "failed to check terminal games for settlement"),
            }
        }
    }

    async fn run_orphan_sweep_loop(self: Arc<Self>) {
        let mut interval = tokio::time::interval(ORPHAN_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            self.sweep_orphans().await;
        }
    }

    /// Reloads every open position directly from the store (§4.7),
    /// independent of this process's in-memory table, and settles any that
    /// reached a terminal game state. Catches positions the regular
    /// settlement loop missed, e.g. after a restart before this process
    /// rehydrated, or a `games.*` terminal event dropped on the bus.
    async fn sweep_orphans(&self) {
        let stored = match store::load_open_positions(&self.pool).await {
            Ok(positions) => positions,
            Err(e) => {
                warn!(error = %e, "orphan sweep failed to load open positions");
                return;
            }
        };
        if stored.is_empty() {
            return;
        }
        let game_ids: Vec<String> = stored.iter().map(|p| p.game_id.clone()).collect();
        match store::games_in_terminal_state(&self.pool, &game_ids).await {
            Ok(terminal) => {
                let terminal_ids: std::collections::HashSet<_> =
                    terminal.into_iter().map(|g| g.game_id).collect();
                let to_settle: Vec<_> = stored
                    .into_iter()
                    .filter(|p| terminal_ids.contains(&p.game_id))
                    .collect();
                if !to_settle.is_empty() {
                    info!(count = to_settle.len(), "orphan sweep settling positions for ended games");
                }
                self.settle_positions(to_settle, AuditOp::OrphanSettlement).await;
            }
            Err(e) => warn!(error = %e, "orphan sweep failed to check terminal games"),
        }
    }

    async fn settle_positions(&self, candidates: Vec<OpenPosition>, op: AuditOp) {
        for position in candidates {
            match settlement::settlement_price(&self.pool, &position).await {
                Ok(Some(price)) => {
                    if let Err(e) = self.finish_close(position, price, true, op).await {
                        warn!(error = %e, "failed to settle position");
                    }
                }
                Ok(None) => debug!(trade_id = %position.trade_id, "settlement price unavailable, retrying next sweep"),
                Err(e) => warn!(trade_id = %position.trade_id, error = %e, "failed to compute settlement price"),
            }
        }
    }

    // -- close accounting --------------------------------------------------

    /// Removes `position` from the in-memory table if present (a no-op for
    /// the orphan-sweep path, whose positions never made it into memory),
    /// applies close accounting, persists it, moves the bankroll through its
    /// CAS path, records the audit trail, and publishes the closed-trade
    /// event.
    async fn finish_close(&self, position: OpenPosition, exit_price: f64, settled: bool, op: AuditOp) -> Result<()> {
        self.positions.lock().await.remove(&position.trade_id);
        let old = serde_json::to_value(&position)?;
        let mut position = position;
        position.close(exit_price, settled);
        store::update_closed_position(&self.pool, &position).await?;

        let net = position.pnl_net.unwrap_or(Cents::ZERO);
        let bankroll = store::update_bankroll(&self.pool, |b| b.apply_net(net)).await?;
        store::record_audit(
            &self.pool,
            &AuditRecord::new(AuditOp::BankrollUpdate, None, Some(serde_json::to_value(&bankroll)?)),
        )
        .await?;
        store::record_audit(
            &self.pool,
            &AuditRecord::new(op, Some(old), Some(serde_json::to_value(&position)?)),
        )
        .await?;

        let event = TradeClosedEvent {
            game_id: position.game_id.clone(),
            sport: position.sport,
            team: position.team.clone(),
            won: matches!(position.outcome, Some(crate::domain::Outcome::Win)),
            closed_at: position.exit_time.unwrap_or_else(Utc::now),
        };
        self.bus.publish(topics::TRADES, &event).await?;

        self.positions_closed.fetch_add(1, Ordering::Relaxed);
        info!(
            trade_id = %position.trade_id,
            net_cents = net.0,
            outcome = ?position.outcome,
            "closed position"
        );
        Ok(())
    }

    // -- heartbeat ----------------------------------------------------------

    async fn run_heartbeat_loop(self: Arc<Self>) {
        let mut interval = tokio::time::interval(HEARTBEAT_INTERVAL);
        loop {
            interval.tick().await;
            let open_count = self.positions.lock().await.len();
            let price_stats = self.stats.snapshot();
            let heartbeat = serde_json::json!({
                "service": "position_tracker",
                "instance_id": self.instance_id,
                "status": "healthy",
                "timestamp": Utc::now(),
                "open_positions": open_count,
                "positions_opened": self.positions_opened.load(Ordering::Relaxed),
                "positions_closed": self.positions_closed.load(Ordering::Relaxed),
                "price_stats": price_stats,
            });
            if let Err(e) = self.bus.publish(topics::HEALTH_HEARTBEATS, &heartbeat).await {
                warn!(error = %e, "failed to publish heartbeat");
            }
        }
    }
}
