//! Builders for domain primitives used across tests.
//!
//! Concise factory functions so tests focus on assertions rather than
//! constructing every field of a `Game`/`OpenPosition`/`MarketPrice`.

use chrono::Utc;

use crate::domain::{
    Cents, Game, GameState, GameStatus, MarketPrice, OpenPosition, Platform, Side, Sport,
};

/// An in-progress game between two teams, defaulting to an NBA matchup.
#[must_use]
pub fn game(game_id: &str, home: &str, away: &str) -> Game {
    Game {
        game_id: game_id.to_string(),
        sport: Sport::NBA,
        home_team: home.to_string(),
        away_team: away.to_string(),
        scheduled_start: Utc::now(),
        status: GameStatus::InProgress,
    }
}

/// A terminal game (`Final`) with the given scoreline, for settlement tests.
#[must_use]
pub fn final_game(game_id: &str, home: &str, away: &str) -> Game {
    Game { status: GameStatus::Final, ..game(game_id, home, away) }
}

/// A live-state snapshot for `game_id`; home/away scores control which
/// side is currently ahead.
#[must_use]
pub fn game_state(game_id: &str, home_score: u32, away_score: u32) -> GameState {
    GameState {
        game_id: game_id.to_string(),
        sport: Sport::NBA,
        home_score,
        away_score,
        period: 4,
        time_remaining_seconds: 0,
        possession_home: None,
        down: None,
        yards_to_go: None,
        yard_line: None,
        is_redzone: false,
        pregame_home_prob: None,
        fetched_at: Utc::now(),
    }
}

/// A top-of-book snapshot for `game_id`/`contract_team` with the given
/// yes-side bid/ask.
#[must_use]
pub fn price(game_id: &str, contract_team: &str, bid: f64, ask: f64) -> MarketPrice {
    MarketPrice {
        game_id: game_id.to_string(),
        platform: Platform::Paper,
        contract_team: contract_team.to_string(),
        yes_bid: bid,
        yes_ask: ask,
        yes_bid_size: 500.0,
        yes_ask_size: 500.0,
        timestamp: Utc::now(),
        publisher_seq: 1,
    }
}

/// An open Yes-side paper position, entered at `entry_price` with no fees.
#[must_use]
pub fn open_position(trade_id: &str, game_id: &str, team: &str, entry_price: f64) -> OpenPosition {
    OpenPosition::open(
        trade_id,
        game_id,
        Sport::NBA,
        team,
        Side::Yes,
        Platform::Paper,
        "m1",
        entry_price,
        10.0,
        Cents::ZERO,
    )
}
