use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::Sport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Pregame,
    InProgress,
    Final,
    Cancelled,
}

/// Identity + schedule metadata, owned and written exactly once (by the
/// orchestrator) per §3's ownership rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub game_id: String,
    pub sport: Sport,
    pub home_team: String,
    pub away_team: String,
    pub scheduled_start: DateTime<Utc>,
    pub status: GameStatus,
}

impl Game {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, GameStatus::Final | GameStatus::Cancelled)
    }
}

/// A poll snapshot, produced by the game shard owning this game. Never
/// mutated after construction (§3 invariant).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub game_id: String,
    pub sport: Sport,
    pub home_score: u32,
    pub away_score: u32,
    pub period: u32,
    pub time_remaining_seconds: u32,
    pub possession_home: Option<bool>,
    pub down: Option<u8>,
    pub yards_to_go: Option<u8>,
    pub yard_line: Option<u8>,
    pub is_redzone: bool,
    pub pregame_home_prob: Option<f64>,
    pub fetched_at: DateTime<Utc>,
}

impl GameState {
    /// Fraction of regulation time elapsed, clamped to `[0,1]`, used for
    /// pregame/live blending (§4.4). Treats any period beyond regulation as
    /// fully elapsed (1.0) since overtime has no defined "game progress".
    #[must_use]
    pub fn game_progress(&self) -> f64 {
        let reg = self.sport.regulation_seconds() as f64;
        if reg <= 0.0 {
            return 1.0;
        }
        let periods = self.sport.regulation_periods().unwrap_or(self.period.max(1));
        if self.period > periods {
            return 1.0;
        }
        let per_period = reg / periods as f64;
        let elapsed_periods = (self.period.saturating_sub(1)) as f64 * per_period;
        let elapsed_this_period = per_period - self.time_remaining_seconds as f64;
        ((elapsed_periods + elapsed_this_period.max(0.0)) / reg).clamp(0.0, 1.0)
    }

    /// Total seconds remaining in the game, including any periods after the
    /// current one, per sport regulation length.
    #[must_use]
    pub fn total_time_remaining(&self) -> u32 {
        let periods = self.sport.regulation_periods();
        let Some(periods) = periods else {
            return self.time_remaining_seconds;
        };
        if self.period >= periods {
            return self.time_remaining_seconds;
        }
        let per_period = self.sport.regulation_seconds() / periods;
        let remaining_full_periods = periods - self.period;
        self.time_remaining_seconds + remaining_full_periods * per_period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(sport: Sport, period: u32, time_remaining: u32) -> GameState {
        GameState {
            game_id: "g1".into(),
            sport,
            home_score: 0,
            away_score: 0,
            period,
            time_remaining_seconds: time_remaining,
            possession_home: None,
            down: None,
            yards_to_go: None,
            yard_line: None,
            is_redzone: false,
            pregame_home_prob: None,
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn game_progress_is_half_at_halftime_for_two_half_sports() {
        // NCAAB: 2 periods of 1200s each. End of period 1 => 50% elapsed.
        let s = state(Sport::NCAAB, 1, 0);
        assert!((s.game_progress() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn game_progress_is_one_at_kickoff_complement() {
        let s = state(Sport::NFL, 1, 900);
        assert!((s.game_progress() - 0.0).abs() < 1e-9);
    }

    #[test]
    fn total_time_remaining_includes_future_periods() {
        let s = state(Sport::NBA, 2, 300);
        // 2 periods of 720s remain after this one (periods 3,4) plus 300s now.
        assert_eq!(s.total_time_remaining(), 300 + 2 * 720);
    }

    #[test]
    fn total_time_remaining_in_overtime_is_just_the_clock() {
        let s = state(Sport::NHL, 4, 120);
        assert_eq!(s.total_time_remaining(), 120);
    }
}
