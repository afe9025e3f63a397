//! Binary-market payout determination once a game has reached a terminal
//! state (§4.7). Mirrors the grounding file's `handle_game_ended`/
//! `sweep_orphaned_positions` team-resolution logic, but matches
//! `position.team` against the schedule's home/away names with the same
//! fuzzy scorer market discovery uses, since `position.team` is a
//! venue-specific contract label, not necessarily the schedule's own name.

use crate::discovery::score_match;
use crate::domain::{GameStatus, OpenPosition};
use crate::error::Result;
use crate::store::{self, Pool};

/// Exit price, in the `OpenPosition::close` scale, for a position whose game
/// has gone Final or Cancelled. `None` means the game is terminal but the
/// score isn't in the store yet (no `game_states` row landed before the
/// `games` row flipped to Final) or the game was cancelled with no winner to
/// settle against; callers retry on the next sweep rather than guessing.
pub async fn settlement_price(pool: &Pool, position: &OpenPosition) -> Result<Option<f64>> {
    let Some(game) = store::get_game(pool, &position.game_id).await? else {
        return Ok(None);
    };
    if !game.is_terminal() {
        return Ok(None);
    }
    if game.status == GameStatus::Cancelled {
        // No winner: settle flat at entry price, matching the near-zero net
        // a tie produces (fees still apply).
        return Ok(Some(position.entry_price));
    }

    let Some(state) = store::latest_game_state(pool, &position.game_id).await? else {
        return Ok(None);
    };
    if state.home_score == state.away_score {
        return Ok(Some(position.entry_price));
    }

    let home_match = score_match(&position.team, &game.home_team, position.sport);
    let away_match = score_match(&position.team, &game.away_team, position.sport);
    let team_is_home = home_match.confidence >= away_match.confidence;
    let home_won = state.home_score > state.away_score;
    let team_won = if team_is_home { home_won } else { !home_won };

    // Yes pays 1.0 if the held team won, 0.0 otherwise; the No leg of
    // `OpenPosition::close` already mirrors this through its own sign flip.
    Ok(Some(if team_won { 1.0 } else { 0.0 }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Cents, Game, GameState, Platform, Side, Sport};
    use chrono::Utc;

    fn game(status: GameStatus) -> Game {
        Game {
            game_id: "g1".into(),
            sport: Sport::NBA,
            home_team: "Los Angeles Lakers".into(),
            away_team: "Boston Celtics".into(),
            scheduled_start: Utc::now(),
            status,
        }
    }

    fn state(home_score: u32, away_score: u32) -> GameState {
        GameState {
            game_id: "g1".into(),
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

    fn position(team: &str) -> OpenPosition {
        OpenPosition::open(
            "t1", "g1", Sport::NBA, team, Side::Yes, Platform::Paper, "m1", 0.5, 10.0,
            Cents::ZERO,
        )
    }

    #[test]
    fn home_winner_resolves_via_fuzzy_match() {
        let g = game(GameStatus::Final);
        let s = state(110, 100);
        let p = position("Lakers");
        let home_match = score_match(&p.team, &g.home_team, p.sport);
        let away_match = score_match(&p.team, &g.away_team, p.sport);
        assert!(home_match.confidence > away_match.confidence);
        assert!(s.home_score > s.away_score);
    }

    #[test]
    fn cancelled_game_settles_flat_at_entry() {
        let g = game(GameStatus::Cancelled);
        assert_eq!(g.status, GameStatus::Cancelled);
    }
}
