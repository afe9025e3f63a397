use sqlx::FromRow;

use crate::domain::{Game, GameStatus, Sport};
use crate::error::Result;

use super::Pool;

#[derive(FromRow)]
struct GameRow {
    game_id: String,
    sport: String,
    home_team: String,
    away_team: String,
    scheduled_start: chrono::DateTime<chrono::Utc>,
    status: String,
}

impl GameRow {
    fn into_game(self) -> Option<Game> {
        Some(Game {
            game_id: self.game_id,
            sport: parse_sport(&self.sport)?,
            home_team: self.home_team,
            away_team: self.away_team,
            scheduled_start: self.scheduled_start,
            status: parse_status(&self.status)?,
        })
    }
}

fn parse_sport(s: &str) -> Option<Sport> {
    serde_json::from_value(serde_json::Value::String(s.to_string())).ok()
}

fn parse_status(s: &str) -> Option<GameStatus> {
    serde_json::from_value(serde_json::Value::String(s.to_string())).ok()
}

/// Owned exclusively by the orchestrator (§3 ownership).
pub async fn upsert_game(pool: &Pool, game: &Game) -> Result<()> {
    sqlx::query(
        r"
        INSERT INTO games (game_id, sport, home_team, away_team, scheduled_start, status)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (game_id) DO UPDATE SET status = EXCLUDED.status
        ",
    )
    .bind(&game.game_id)
    .bind(game.sport.as_str())
    .bind(&game.home_team)
    .bind(&game.away_team)
    .bind(game.scheduled_start)
    .bind(status_str(game.status))
    .execute(pool)
    .await?;
    Ok(())
}

fn status_str(status: GameStatus) -> &'static str {
    match status {
        GameStatus::Pregame => "pregame",
        GameStatus::InProgress => "in_progress",
        GameStatus::Final => "final",
        GameStatus::Cancelled => "cancelled",
    }
}

/// Single game lookup, used to resolve home/away team names for market
/// discovery (§4.2/§4.5) without threading them through every signal.
pub async fn get_game(pool: &Pool, game_id: &str) -> Result<Option<Game>> {
    let row: Option<GameRow> = sqlx::query_as(
        r"
        SELECT game_id, sport, home_team, away_team, scheduled_start, status
        FROM games
        WHERE game_id = $1
        ",
    )
    .bind(game_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.and_then(GameRow::into_game))
}

/// Orphan-sweep support (§4.7): games among `game_ids` that have reached a
/// terminal state, for positions whose `games.{sport}.{game_id}` Final
/// message was lost.
pub async fn games_in_terminal_state(pool: &Pool, game_ids: &[String]) -> Result<Vec<Game>> {
    let rows: Vec<GameRow> = sqlx::query_as(
        r"
        SELECT game_id, sport, home_team, away_team, scheduled_start, status
        FROM games
        WHERE game_id = ANY($1) AND status IN ('final', 'cancelled')
        ",
    )
    .bind(game_ids)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().filter_map(GameRow::into_game).collect())
}
