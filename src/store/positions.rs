use crate::domain::{Cents, OpenPosition, Outcome, Platform, PositionStatus, Side, Sport};
use crate::error::Result;

use super::Pool;

#[derive(sqlx::FromRow)]
struct PositionRow {
    trade_id: String,
    game_id: String,
    sport: String,
    team: String,
    side: String,
    platform: String,
    market_id: String,
    entry_price: f64,
    size: f64,
    entry_time: chrono::DateTime<chrono::Utc>,
    entry_fees: i64,
    status: String,
    exit_price: Option<f64>,
    exit_time: Option<chrono::DateTime<chrono::Utc>>,
    exit_fees: Option<i64>,
    pnl_gross: Option<i64>,
    pnl_net: Option<i64>,
    outcome: Option<String>,
}

fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Option<T> {
    serde_json::from_value(serde_json::Value::String(s.to_string())).ok()
}

impl PositionRow {
    fn into_position(self) -> Option<OpenPosition> {
        Some(OpenPosition {
            trade_id: self.trade_id,
            game_id: self.game_id,
            sport: parse_enum::<Sport>(&self.sport)?,
            team: self.team,
            side: parse_enum::<Side>(&self.side)?,
            platform: parse_enum::<Platform>(&self.platform)?,
            market_id: self.market_id,
            entry_price: self.entry_price,
            size: self.size,
            entry_time: self.entry_time,
            entry_fees: Cents(self.entry_fees),
            status: parse_enum::<PositionStatus>(&self.status)?,
            exit_price: self.exit_price,
            exit_time: self.exit_time,
            exit_fees: self.exit_fees.map(Cents),
            pnl_gross: self.pnl_gross.map(Cents),
            pnl_net: self.pnl_net.map(Cents),
            outcome: self.outcome.as_deref().and_then(parse_enum::<Outcome>),
        })
    }
}

fn status_str(status: PositionStatus) -> &'static str {
    match status {
        PositionStatus::Open => "open",
        PositionStatus::Closed => "closed",
        PositionStatus::Settled => "settled",
    }
}

fn outcome_str(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Win => "win",
        Outcome::Loss => "loss",
        Outcome::Push => "push",
    }
}

pub async fn insert_open_position(pool: &Pool, position: &OpenPosition) -> Result<()> {
    sqlx::query(
        r"
        INSERT INTO positions (
            trade_id, game_id, sport, team, side, platform, market_id, entry_price, size,
            entry_time, entry_fees, status
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ",
    )
    .bind(&position.trade_id)
    .bind(&position.game_id)
    .bind(position.sport.as_str())
    .bind(&position.team)
    .bind(position.side.as_str())
    .bind(serde_json::to_value(position.platform)?.as_str().unwrap_or_default())
    .bind(&position.market_id)
    .bind(position.entry_price)
    .bind(position.size)
    .bind(position.entry_time)
    .bind(position.entry_fees.0)
    .bind(status_str(position.status))
    .execute(pool)
    .await?;
    Ok(())
}

/// All currently-open positions, used both to rehydrate position-tracker
/// state on restart and to drive the orphan sweep (§4.7).
pub async fn load_open_positions(pool: &Pool) -> Result<Vec<OpenPosition>> {
    let rows: Vec<PositionRow> = sqlx::query_as(
        r"
        SELECT trade_id, game_id, sport, team, side, platform, market_id, entry_price, size,
               entry_time, entry_fees, status, exit_price, exit_time, exit_fees,
               pnl_gross, pnl_net, outcome
        FROM positions
        WHERE status = 'open'
        ",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().filter_map(PositionRow::into_position).collect())
}

pub async fn update_closed_position(pool: &Pool, position: &OpenPosition) -> Result<()> {
    sqlx::query(
        r"
        UPDATE positions
        SET status = $2, exit_price = $3, exit_time = $4, exit_fees = $5,
            pnl_gross = $6, pnl_net = $7, outcome = $8
        WHERE trade_id = $1
        ",
    )
    .bind(&position.trade_id)
    .bind(status_str(position.status))
    .bind(position.exit_price)
    .bind(position.exit_time)
    .bind(position.exit_fees.map(|c| c.0))
    .bind(position.pnl_gross.map(|c| c.0))
    .bind(position.pnl_net.map(|c| c.0))
    .bind(position.outcome.map(outcome_str))
    .execute(pool)
    .await?;
    Ok(())
}

/// Risk check input: how many open positions already exist for this game,
/// across all teams/sides (§4.6 "one open position per game" rule).
pub async fn open_position_count_for_game(pool: &Pool, game_id: &str) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as(
        r"SELECT COUNT(*) FROM positions WHERE game_id = $1 AND status = 'open'",
    )
    .bind(game_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// The currently-open position for (game, team), if any — used by the
/// same-side-duplicate and opposing-side pre-trade filters (§4.5).
pub async fn open_position_for_team(pool: &Pool, game_id: &str, team: &str) -> Result<Option<OpenPosition>> {
    let row: Option<PositionRow> = sqlx::query_as(
        r"
        SELECT trade_id, game_id, sport, team, side, platform, market_id, entry_price, size,
               entry_time, entry_fees, status, exit_price, exit_time, exit_fees,
               pnl_gross, pnl_net, outcome
        FROM positions
        WHERE game_id = $1 AND team = $2 AND status = 'open'
        LIMIT 1
        ",
    )
    .bind(game_id)
    .bind(team)
    .fetch_optional(pool)
    .await?;
    Ok(row.and_then(PositionRow::into_position))
}

/// Risk check input: total cents currently committed to open positions in
/// this game, for the per-game exposure cap (§4.6).
pub async fn game_exposure_cents(pool: &Pool, game_id: &str) -> Result<i64> {
    let (total,): (Option<i64>,) = sqlx::query_as(
        r"
        SELECT SUM(entry_fees + CAST(entry_price * size * 100 AS BIGINT))
        FROM positions
        WHERE game_id = $1 AND status = 'open'
        ",
    )
    .bind(game_id)
    .fetch_one(pool)
    .await?;
    Ok(total.unwrap_or(0))
}

/// Risk check input: total cents currently committed to open positions in
/// this sport, for the per-sport exposure cap (§4.6).
pub async fn sport_exposure_cents(pool: &Pool, sport: Sport) -> Result<i64> {
    let (total,): (Option<i64>,) = sqlx::query_as(
        r"
        SELECT SUM(entry_fees + CAST(entry_price * size * 100 AS BIGINT))
        FROM positions
        WHERE sport = $1 AND status = 'open'
        ",
    )
    .bind(sport.as_str())
    .fetch_one(pool)
    .await?;
    Ok(total.unwrap_or(0))
}

/// Risk check input: realized net P&L across positions closed today, for
/// the daily-loss circuit breaker (§4.6).
pub async fn total_daily_loss_cents(pool: &Pool) -> Result<i64> {
    let (total,): (Option<i64>,) = sqlx::query_as(
        r"
        SELECT SUM(pnl_net)
        FROM positions
        WHERE status IN ('closed', 'settled')
          AND exit_time >= date_trunc('day', now())
          AND pnl_net < 0
        ",
    )
    .fetch_one(pool)
    .await?;
    Ok(total.unwrap_or(0))
}
