use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::edge::{arbitrage_net_cost, has_arbitrage, larger_absolute_edge, model_edge};
use super::types::{GameContext, PriceListenerStats};
use super::win_prob::win_probabilities;
use crate::domain::{Direction, GameState, GameStatus, MarketPrice, SignalType, Sport, TradingSignal};
use crate::messaging::{topics, HotBus};
use crate::store::Pool;

const POLL_INTERVAL: Duration = Duration::from_secs(1);
const PRICE_STALENESS_TTL: chrono::Duration = chrono::Duration::seconds(30);
const GAME_STATE_STALENESS_TTL: chrono::Duration = chrono::Duration::seconds(30);
const SIGNAL_DEBOUNCE: chrono::Duration = chrono::Duration::seconds(15);
const MIN_EDGE_PCT: f64 = 3.5;

/// Builds the risk-free arbitrage signal for a cross-venue quote pair (§4.4):
/// buy YES on `venue_a`, buy the mirrored NO on `venue_b`. `model_prob` is
/// pinned to certainty and `market_prob` carries the fee-adjusted net cost,
/// so `edge_pct` reads as the locked-in profit margin.
#[must_use]
fn build_arbitrage_signal(
    game_id: &str,
    sport: Sport,
    team: &str,
    venue_a: &MarketPrice,
    venue_b: &MarketPrice,
) -> TradingSignal {
    let fee_pct = venue_a.platform.round_trip_fee_pct() + venue_b.platform.round_trip_fee_pct();
    let net_cost = arbitrage_net_cost(venue_a, venue_b, fee_pct);
    let liquidity = venue_a.yes_ask_size.min(venue_b.yes_bid_size);
    TradingSignal::new(
        game_id.to_string(),
        sport,
        team.to_string(),
        Direction::Buy,
        SignalType::Arbitrage,
        1.0,
        Some(net_cost),
        Some(venue_a.platform),
        Some(venue_a.yes_ask),
        liquidity,
        1.0,
    )
}

/// A live-state fetch, abstracted so the monitor loop doesn't depend on a
/// concrete schedule-provider client.
#[async_trait::async_trait]
pub trait LiveStateProvider: Send + Sync {
    async fn fetch_state(&self, game_id: &str, sport: Sport) -> crate::error::Result<GameState>;
    async fn fetch_status(&self, game_id: &str, sport: Sport) -> crate::error::Result<GameStatus>;
}

/// Drives one game's monitor: Idle -> Monitoring -> (Emitting | Debounced)
/// -> Monitoring -> Stopped (§4.4 state machine). Runs until cancelled or
/// the game reaches Final/Cancelled.
pub async fn monitor_game(
    context: Arc<tokio::sync::Mutex<GameContext>>,
    provider: Arc<dyn LiveStateProvider>,
    bus: HotBus,
    pool: Pool,
    stats: Arc<PriceListenerStats>,
    cancel: CancellationToken,
) {
    let (game_id, sport) = {
        let ctx = context.lock().await;
        (ctx.game_id.clone(), ctx.sport)
    };
    let mut last_signal_at: Option<chrono::DateTime<Utc>> = None;
    let mut interval = tokio::time::interval(POLL_INTERVAL);

    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                info!(game_id = %game_id, "monitor stopped by cancellation");
                return;
            }
            _ = interval.tick() => {}
        }

        let status = match provider.fetch_status(&game_id, sport).await {
            Ok(status) => status,
            Err(e) => {
                debug!(game_id = %game_id, error = %e, "status fetch failed, retrying next tick");
                continue;
            }
        };
        if status != GameStatus::InProgress {
            if matches!(status, GameStatus::Final | GameStatus::Cancelled) {
                info!(game_id = %game_id, "game reached terminal state, stopping monitor");
                return;
            }
            continue;
        }

        let state = match provider.fetch_state(&game_id, sport).await {
            Ok(state) => state,
            Err(e) => {
                debug!(game_id = %game_id, error = %e, "state fetch failed, skipping tick");
                continue;
            }
        };

        let now = Utc::now();
        let fetch_age = now.signed_duration_since(state.fetched_at);
        let stale = fetch_age >= GAME_STATE_STALENESS_TTL;

        if let Err(e) = crate::store::insert_game_state(&pool, &state).await {
            warn!(game_id = %game_id, error = %e, "failed to persist game state snapshot");
        }
        let topic = topics::games(sport.as_str(), &game_id);
        if let Err(e) = bus.publish(&topic, &state).await {
            warn!(game_id = %game_id, error = %e, "failed to publish game state");
        }

        if stale {
            continue;
        }

        let (home_prob, away_prob) = win_probabilities(&state);

        let (home_team, away_team, home_price, away_price, home_venue_pair, away_venue_pair) = {
            let ctx = context.lock().await;
            (
                ctx.home_team.clone(),
                ctx.away_team.clone(),
                ctx.freshest_home_price().cloned(),
                ctx.freshest_away_price().cloned(),
                ctx.home_venue_pair().map(|(a, b)| (a.clone(), b.clone())),
                ctx.away_venue_pair().map(|(a, b)| (a.clone(), b.clone())),
            )
        };

        let debounced = last_signal_at.is_some_and(|t| now.signed_duration_since(t) < SIGNAL_DEBOUNCE);
        if !debounced {
            let arb = [(&home_team, home_venue_pair), (&away_team, away_venue_pair)]
                .into_iter()
                .find_map(|(team, pair)| {
                    let (venue_a, venue_b) = pair?;
                    let fee_pct = venue_a.platform.round_trip_fee_pct() + venue_b.platform.round_trip_fee_pct();
                    has_arbitrage(&venue_a, &venue_b, fee_pct).then(|| build_arbitrage_signal(&game_id, sport, team, &venue_a, &venue_b))
                });
            if let Some(signal) = arb {
                if let Err(e) = bus.publish(topics::SIGNALS_TRADE, &signal).await {
                    warn!(game_id = %game_id, error = %e, "failed to publish arbitrage signal");
                } else {
                    last_signal_at = Some(now);
                    stats.record_processed();
                    continue;
                }
            }
        }

        if let (Some(home_price), Some(away_price)) = (home_price, away_price) {
            let home_fresh = home_price.is_fresh(PRICE_STALENESS_TTL, now) && home_price.is_valid_book();
            let away_fresh = away_price.is_fresh(PRICE_STALENESS_TTL, now) && away_price.is_valid_book();
            if !home_fresh || !away_fresh {
                stats.record_no_liquidity_skipped();
                continue;
            }

            let home_edge = model_edge(home_prob, &home_price);
            let away_edge = model_edge(away_prob, &away_price);
            let (is_home, edge) = larger_absolute_edge(home_edge, away_edge);

            if edge.edge_pct.abs() < MIN_EDGE_PCT {
                continue;
            }
            if debounced {
                continue;
            }

            let team = if is_home { &home_team } else { &away_team };
            let direction = if edge.edge_pct > 0.0 { Direction::Buy } else { Direction::Sell };
            let signal_type = match direction {
                Direction::Buy => SignalType::ModelEdgeYes,
                Direction::Sell => SignalType::ModelEdgeNo,
            };
            let price = if is_home { &home_price } else { &away_price };
            // Limit price per direction (§4.5): Buy -> yes_ask, Sell (NO) -> 1 - yes_bid.
            let limit_price = match direction {
                Direction::Buy => price.yes_ask,
                Direction::Sell => 1.0 - price.yes_bid,
            };
            let signal = TradingSignal::new(
                game_id.clone(),
                sport,
                team.clone(),
                direction,
                signal_type,
                edge.model_prob,
                Some(edge.market_mid),
                Some(price.platform),
                Some(limit_price),
                price.yes_ask_size.min(price.yes_bid_size),
                edge.edge_pct.abs() / 100.0,
            );
            if let Err(e) = bus.publish(topics::SIGNALS_TRADE, &signal).await {
                warn!(game_id = %game_id, error = %e, "failed to publish trading signal");
            } else {
                last_signal_at = Some(now);
                stats.record_processed();
            }
        }
    }
}
