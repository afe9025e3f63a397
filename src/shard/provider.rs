//! Concrete `LiveStateProvider`: an ESPN-like scoreboard client that turns
//! one game's competitor/situation payload into a [`GameState`] snapshot
//! (§4.4). Shares the allowlisted-path-segment discipline of
//! `orchestrator::schedule::ScheduleProvider` since both clients hit the
//! same kind of `{sport}/{league}/scoreboard` endpoint.

use chrono::Utc;
use serde::Deserialize;

use super::monitor::LiveStateProvider;
use crate::domain::{GameState, GameStatus, Sport};
use crate::error::{Error, Result};

const ALLOWED_SEGMENTS: &[&str] = &[
    "football", "basketball", "hockey", "baseball", "soccer", "tennis", "mma",
    "nfl", "nba", "nhl", "mlb", "mls", "college-football", "mens-college-basketball",
];

fn validate_segment(segment: &str) -> Result<()> {
    let valid_chars = segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
    if !valid_chars || !ALLOWED_SEGMENTS.contains(&segment) {
        return Err(Error::Config(format!("rejected live-state path segment: {segment:?}")));
    }
    Ok(())
}

fn sport_category_segment(sport: Sport) -> &'static str {
    match sport {
        Sport::NFL | Sport::NCAAF => "football",
        Sport::NBA | Sport::NCAAB => "basketball",
        Sport::NHL => "hockey",
        Sport::MLB => "baseball",
        Sport::MLS | Sport::Soccer => "soccer",
        Sport::Tennis => "tennis",
        Sport::MMA => "mma",
    }
}

fn league_segment(sport: Sport) -> &'static str {
    match sport {
        Sport::NFL => "nfl",
        Sport::NBA => "nba",
        Sport::NHL => "nhl",
        Sport::MLB => "mlb",
        Sport::NCAAF => "college-football",
        Sport::NCAAB => "mens-college-basketball",
        Sport::MLS => "mls",
        Sport::Soccer => "soccer",
        Sport::Tennis => "tennis",
        Sport::MMA => "mma",
    }
}

fn parse_status(state: &str) -> GameStatus {
    match state {
        "pre" => GameStatus::Pregame,
        "in" => GameStatus::InProgress,
        "post" => GameStatus::Final,
        _ => GameStatus::Cancelled,
    }
}

#[derive(Debug, Deserialize)]
struct ScoreboardResponse {
    events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
struct Event {
    id: String,
    status: EventStatus,
    competitions: Vec<Competition>,
}

#[derive(Debug, Deserialize)]
struct EventStatus {
    #[serde(rename = "type")]
    status_type: EventStatusType,
    period: u32,
    #[serde(rename = "displayClock")]
    display_clock: String,
}

#[derive(Debug, Deserialize)]
struct EventStatusType {
    state: String,
}

#[derive(Debug, Deserialize)]
struct Competition {
    competitors: Vec<Competitor>,
    #[serde(default)]
    situation: Option<Situation>,
}

#[derive(Debug, Deserialize)]
struct Competitor {
    #[serde(rename = "homeAway")]
    home_away: String,
    score: String,
}

#[derive(Debug, Deserialize, Default)]
struct Situation {
    #[serde(default)]
    down: Option<u8>,
    #[serde(rename = "yardLine", default)]
    yard_line: Option<u8>,
    #[serde(rename = "distance", default)]
    yards_to_go: Option<u8>,
    #[serde(rename = "isRedZone", default)]
    is_red_zone: bool,
    #[serde(rename = "possession", default)]
    possession_team_id: Option<String>,
}

/// Parses `"MM:SS"` (or a bare seconds count) into whole seconds, defaulting
/// to `0` on anything malformed rather than failing the whole snapshot.
fn parse_clock_seconds(clock: &str) -> u32 {
    if let Some((mins, secs)) = clock.split_once(':') {
        let mins: u32 = mins.parse().unwrap_or(0);
        let secs: u32 = secs.parse().unwrap_or(0);
        mins * 60 + secs
    } else {
        clock.parse().unwrap_or(0)
    }
}

/// ESPN-like live game-state client (§4.4, §6). One scoreboard fetch
/// returns every in-flight game for a sport; the provider filters down to
/// the one game a monitor task asked about, mirroring the game shard's own
/// ESPN-polling grounding file rather than a per-game endpoint ESPN doesn't
/// actually expose.
pub struct EspnLiveStateProvider {
    base_url: String,
    client: reqwest::Client,
}

impl EspnLiveStateProvider {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    async fn fetch_event(&self, game_id: &str, sport: Sport) -> Result<Event> {
        let category = sport_category_segment(sport);
        let league = league_segment(sport);
        validate_segment(category)?;
        validate_segment(league)?;

        let url = format!("{}/{category}/{league}/scoreboard", self.base_url);
        let response: ScoreboardResponse = self
            .client
            .get(&url)
            .timeout(std::time::Duration::from_secs(5))
            .send()
            .await?
            .json()
            .await?;

        response
            .events
            .into_iter()
            .find(|event| event.id == game_id)
            .ok_or_else(|| Error::Stale(format!("game {game_id} not found in {category}/{league} scoreboard")))
    }
}

#[async_trait::async_trait]
impl LiveStateProvider for EspnLiveStateProvider {
    async fn fetch_status(&self, game_id: &str, sport: Sport) -> Result<GameStatus> {
        let event = self.fetch_event(game_id, sport).await?;
        Ok(parse_status(&event.status.status_type.state))
    }

    async fn fetch_state(&self, game_id: &str, sport: Sport) -> Result<GameState> {
        let event = self.fetch_event(game_id, sport).await?;
        let competition = event
            .competitions
            .into_iter()
            .next()
            .ok_or_else(|| Error::Stale(format!("game {game_id} has no competition data")))?;

        let home = competition
            .competitors
            .iter()
            .find(|c| c.home_away == "home")
            .ok_or_else(|| Error::Stale(format!("game {game_id} missing home competitor")))?;
        let away = competition
            .competitors
            .iter()
            .find(|c| c.home_away == "away")
            .ok_or_else(|| Error::Stale(format!("game {game_id} missing away competitor")))?;

        let home_score: u32 = home.score.parse().unwrap_or(0);
        let away_score: u32 = away.score.parse().unwrap_or(0);
        let situation = competition.situation.unwrap_or_default();

        Ok(GameState {
            game_id: game_id.to_string(),
            sport,
            home_score,
            away_score,
            period: event.status.period,
            time_remaining_seconds: parse_clock_seconds(&event.status.display_clock),
            possession_home: situation.possession_team_id.as_deref().map(|id| id == "home"),
            down: situation.down,
            yards_to_go: situation.yards_to_go,
            yard_line: situation.yard_line,
            is_redzone: situation.is_red_zone,
            pregame_home_prob: None,
            fetched_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_parses_minutes_and_seconds() {
        assert_eq!(parse_clock_seconds("12:34"), 754);
        assert_eq!(parse_clock_seconds("0:05"), 5);
        assert_eq!(parse_clock_seconds("garbage"), 0);
    }

    #[test]
    fn rejects_non_allowlisted_segment() {
        assert!(validate_segment("nfl").is_ok());
        assert!(validate_segment("nfl; rm -rf").is_err());
        assert!(validate_segment("unknown-league").is_err());
    }
}
