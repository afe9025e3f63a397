use crate::domain::{GameState, Sport};
use crate::error::Result;

use super::Pool;

#[derive(sqlx::FromRow)]
struct GameStateRow {
    game_id: String,
    sport: String,
    home_score: i64,
    away_score: i64,
    period: i64,
    time_remaining_seconds: i64,
    possession_home: Option<bool>,
    down: Option<i16>,
    yards_to_go: Option<i16>,
    yard_line: Option<i16>,
    is_redzone: bool,
    pregame_home_prob: Option<f64>,
    fetched_at: chrono::DateTime<chrono::Utc>,
}

impl GameStateRow {
    fn into_state(self) -> Option<GameState> {
        let sport: Sport = serde_json::from_value(serde_json::Value::String(self.sport)).ok()?;
        Some(GameState {
            game_id: self.game_id,
            sport,
            home_score: self.home_score as u32,
            away_score: self.away_score as u32,
            period: self.period as u32,
            time_remaining_seconds: self.time_remaining_seconds as u32,
            possession_home: self.possession_home,
            down: self.down.map(|v| v as u8),
            yards_to_go: self.yards_to_go.map(|v| v as u8),
            yard_line: self.yard_line.map(|v| v as u8),
            is_redzone: self.is_redzone,
            pregame_home_prob: self.pregame_home_prob,
            fetched_at: self.fetched_at,
        })
    }
}

/// Time-series insert only, §3: `GameState` snapshots are never mutated
/// after construction.
pub async fn insert_game_state(pool: &Pool, state: &GameState) -> Result<()> {
    sqlx::query(
        r"
        INSERT INTO game_states (
            game_id, sport, home_score, away_score, period, time_remaining_seconds,
            possession_home, down, yards_to_go, yard_line, is_redzone,
            pregame_home_prob, fetched_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        ",
    )
    .bind(&state.game_id)
    .bind(state.sport.as_str())
    .bind(i64::from(state.home_score))
    .bind(i64::from(state.away_score))
    .bind(i64::from(state.period))
    .bind(i64::from(state.time_remaining_seconds))
    .bind(state.possession_home)
    .bind(state.down.map(i16::from))
    .bind(state.yards_to_go.map(i16::from))
    .bind(state.yard_line.map(i16::from))
    .bind(state.is_redzone)
    .bind(state.pregame_home_prob)
    .bind(state.fetched_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Most recent snapshot for a game, used by the position tracker to derive
/// the final score at settlement (§4.7) — the last tick before a game went
/// Final carries the score the market ultimately paid out on.
pub async fn latest_game_state(pool: &Pool, game_id: &str) -> Result<Option<GameState>> {
    let row: Option<GameStateRow> = sqlx::query_as(
        r"
        SELECT game_id, sport, home_score, away_score, period, time_remaining_seconds,
               possession_home, down, yards_to_go, yard_line, is_redzone,
               pregame_home_prob, fetched_at
        FROM game_states
        WHERE game_id = $1
        ORDER BY fetched_at DESC
        LIMIT 1
        ",
    )
    .bind(game_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.and_then(GameStateRow::into_state))
}
