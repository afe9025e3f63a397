use crate::domain::{GameState, Sport};

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn logit(p: f64) -> f64 {
    let clamped = p.clamp(1e-6, 1.0 - 1e-6);
    (clamped / (1.0 - clamped)).ln()
}

/// `(home_win_prob, away_win_prob)` for the current state, computed by a
/// deterministic sport-specific pure function (§4.4). `away = 1 - home`.
#[must_use]
pub fn win_probabilities(state: &GameState) -> (f64, f64) {
    let p_live = live_home_win_prob(state);
    let p = match state.pregame_home_prob {
        Some(pregame) => blend_with_pregame(pregame, p_live, state.game_progress()),
        None => p_live,
    };
    (p, 1.0 - p)
}

/// Pregame/live log-odds blend (§4.4): at kickoff ~50/50 weight, decaying
/// toward all-live by the end of regulation.
fn blend_with_pregame(pregame_prob: f64, live_prob: f64, game_progress: f64) -> f64 {
    let w_pre = 0.5 * (-2.5 * game_progress).exp();
    let w_live = 1.0 - w_pre;
    let blended = w_pre * logit(pregame_prob) + w_live * logit(live_prob);
    logistic(blended)
}

fn live_home_win_prob(state: &GameState) -> f64 {
    match state.sport {
        Sport::NFL | Sport::NCAAF => football_win_prob(state),
        Sport::NBA | Sport::NCAAB => basketball_win_prob(state),
        Sport::NHL => clock_based_win_prob(state, 2.8),
        Sport::MLB => clock_based_win_prob(state, 1.6),
        Sport::MLS | Sport::Soccer => clock_based_win_prob(state, 1.1),
        Sport::Tennis => clock_based_win_prob(state, 1.3),
        Sport::MMA => clock_based_win_prob(state, 2.0),
    }
}

/// §4.4: `score_diff` plus possession/field-position/down adjustments,
/// divided by a volatility that shrinks as `sqrt(time_fraction_remaining)`.
fn football_win_prob(state: &GameState) -> f64 {
    let score_diff = state.home_score as f64 - state.away_score as f64;
    let time_fraction_remaining = 1.0 - state.game_progress();
    let sigma = 14.0 * time_fraction_remaining.max(0.0).sqrt().max(0.05);

    let mut adjustment = 0.0;
    if let Some(possession_home) = state.possession_home {
        let field_position_weight = match state.yard_line {
            Some(yard_line) => (yard_line as f64 / 100.0).clamp(0.3, 1.0),
            None => 0.5,
        };
        let possession_points = 2.5 * field_position_weight;
        adjustment += if possession_home { possession_points } else { -possession_points };

        if state.is_redzone {
            let redzone_points = if possession_home { 4.0 } else { -4.0 };
            adjustment += redzone_points;
        }

        if let Some(down) = state.down {
            let down_penalty = f64::from(down.saturating_sub(1)) * 0.5;
            adjustment += if possession_home { -down_penalty } else { down_penalty };
        }
    }

    logistic((score_diff + adjustment) / sigma)
}

/// §4.4: possessions-remaining estimate from clock+period, one possession
/// worth ~1 point, deficits harden (become more certain) late.
fn basketball_win_prob(state: &GameState) -> f64 {
    let score_diff = state.home_score as f64 - state.away_score as f64;
    let seconds_remaining = state.total_time_remaining() as f64;
    const SECONDS_PER_POSSESSION: f64 = 48.0;
    let possessions_remaining = (seconds_remaining / SECONDS_PER_POSSESSION).max(1.0);
    let sigma = 2.2 * possessions_remaining.sqrt();
    logistic(score_diff / sigma)
}

/// Shared reduction for sports without football/basketball-specific
/// adjustments: score-differential vs. time-left logistic, scaled by a
/// sport-specific variance coefficient (§4.4).
fn clock_based_win_prob(state: &GameState, points_per_sigma_unit: f64) -> f64 {
    let score_diff = state.home_score as f64 - state.away_score as f64;
    let time_fraction_remaining = 1.0 - state.game_progress();
    let sigma = points_per_sigma_unit * (time_fraction_remaining.max(0.0).sqrt().max(0.05)) * 10.0;
    logistic(score_diff / sigma)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn state(sport: Sport, home: u32, away: u32, period: u32, remaining: u32) -> GameState {
        GameState {
            game_id: "g1".into(),
            sport,
            home_score: home,
            away_score: away,
            period,
            time_remaining_seconds: remaining,
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
    fn tied_game_is_roughly_even() {
        let s = state(Sport::NBA, 50, 50, 2, 600);
        let (home, away) = win_probabilities(&s);
        assert!((home - 0.5).abs() < 0.05);
        assert!((home + away - 1.0).abs() < 1e-9);
    }

    #[test]
    fn large_lead_late_is_near_certain() {
        let s = state(Sport::NBA, 110, 80, 4, 30);
        let (home, _) = win_probabilities(&s);
        assert!(home > 0.95);
    }

    #[test]
    fn nba_home_up_five_late_q4_favors_home_strongly() {
        let s = state(Sport::NBA, 100, 95, 4, 240);
        let (home, _) = win_probabilities(&s);
        assert!((home - 0.74).abs() < 0.02);
    }

    #[test]
    fn away_prob_is_always_complement() {
        let s = state(Sport::NFL, 17, 24, 3, 400);
        let (home, away) = win_probabilities(&s);
        assert!((home + away - 1.0).abs() < 1e-9);
    }

    #[test]
    fn pregame_blend_dominates_at_kickoff() {
        let mut s = state(Sport::NFL, 0, 0, 1, 900);
        s.pregame_home_prob = Some(0.65);
        let (home, _) = win_probabilities(&s);
        // At kickoff (game_progress ~0), pregame should pull noticeably
        // away from the live 50/50 estimate toward 0.65.
        assert!(home > 0.55);
    }
}
