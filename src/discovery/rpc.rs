use serde::{Deserialize, Serialize};

use super::team_match::MatchMethod;
use crate::domain::Sport;

/// Request on `team:match:request` (§4.2). Default timeout 2s; a caller
/// that sees no response before then treats it as fail-closed non-match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMatchRequest {
    pub request_id: String,
    pub target_team: String,
    pub candidate_team: String,
    pub sport: Sport,
}

/// Response on `team:match:response:{request_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMatchResponse {
    pub request_id: String,
    pub is_match: bool,
    pub confidence: f64,
    pub method: MatchMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketLookupRequest {
    pub sport: Sport,
    pub home_team: String,
    pub away_team: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketLookupResponse {
    pub markets: Vec<super::MarketIds>,
}
