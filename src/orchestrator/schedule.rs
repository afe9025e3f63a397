use serde::Deserialize;

use crate::domain::{Game, GameStatus, Sport};
use crate::error::{Error, Result};

/// Allowlisted sport/league path segments for the schedule provider
/// (§4.3, §6). Any other token is rejected before it reaches an outbound
/// HTTP call.
const ALLOWED_SEGMENTS: &[&str] = &[
    "football", "basketball", "hockey", "baseball", "soccer", "tennis", "mma",
    "nfl", "nba", "nhl", "mlb", "mls", "college-football", "mens-college-basketball",
];

fn validate_segment(segment: &str) -> Result<()> {
    let valid_chars = segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
    if !valid_chars || !ALLOWED_SEGMENTS.contains(&segment) {
        return Err(Error::Config(format!("rejected schedule-provider path segment: {segment:?}")));
    }
    Ok(())
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

#[derive(Debug, Deserialize)]
struct ScheduleResponse {
    events: Vec<ScheduleEvent>,
}

#[derive(Debug, Deserialize)]
struct ScheduleEvent {
    id: String,
    status: ScheduleStatus,
    date: chrono::DateTime<chrono::Utc>,
    competitors: Vec<ScheduleCompetitor>,
}

#[derive(Debug, Deserialize)]
struct ScheduleStatus {
    #[serde(rename = "type")]
    status_type: ScheduleStatusType,
}

#[derive(Debug, Deserialize)]
struct ScheduleStatusType {
    state: String,
}

#[derive(Debug, Deserialize)]
struct ScheduleCompetitor {
    #[serde(rename = "homeAway")]
    home_away: String,
    #[serde(rename = "displayName")]
    display_name: String,
}

fn parse_status(state: &str) -> GameStatus {
    match state {
        "pre" => GameStatus::Pregame,
        "in" => GameStatus::InProgress,
        "post" => GameStatus::Final,
        _ => GameStatus::Cancelled,
    }
}

/// ESPN-like schedule provider client. Base URL and league/sport mapping
/// follow an ESPN-style `{sport}/{league}/scoreboard` path (§6).
pub struct ScheduleProvider {
    base_url: String,
    client: reqwest::Client,
}

impl ScheduleProvider {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), client: reqwest::Client::new() }
    }

    /// Fetches the scoreboard for one sport, validating path segments
    /// against the allowlist before issuing the request (§4.3).
    pub async fn fetch_live_games(&self, sport: Sport) -> Result<Vec<Game>> {
        let league = league_segment(sport);
        let sport_segment = sport_category_segment(sport);
        validate_segment(sport_segment)?;
        validate_segment(league)?;

        let url = format!("{}/{}/{}/scoreboard", self.base_url, sport_segment, league);
        let response: ScheduleResponse = self
            .client
            .get(&url)
            .timeout(std::time::Duration::from_secs(5))
            .send()
            .await?
            .json()
            .await?;

        Ok(response
            .events
            .into_iter()
            .filter_map(|event| to_game(sport, event))
            .collect())
    }
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

fn to_game(sport: Sport, event: ScheduleEvent) -> Option<Game> {
    let home = event.competitors.iter().find(|c| c.home_away == "home")?;
    let away = event.competitors.iter().find(|c| c.home_away == "away")?;
    Some(Game {
        game_id: event.id,
        sport,
        home_team: home.display_name.clone(),
        away_team: away.display_name.clone(),
        scheduled_start: event.date,
        status: parse_status(&event.status.status_type.state),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_allowlisted_segment() {
        assert!(validate_segment("nfl").is_ok());
        assert!(validate_segment("nfl; rm -rf").is_err());
        assert!(validate_segment("unknown-league").is_err());
    }
}
