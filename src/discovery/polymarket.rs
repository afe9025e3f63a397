use serde::Deserialize;

use super::team_match::contextual_score;
use super::MarketIds;
use crate::domain::{Platform, Sport};
use crate::error::Result;

const GAMMA_BASE_URL: &str = "https://gamma-api.polymarket.com";

#[derive(Debug, Deserialize)]
struct GammaMarket {
    #[serde(rename = "conditionId")]
    condition_id: String,
    question: String,
}

/// Queries the Polymarket Gamma markets listing for moneyline candidates.
/// Polymarket has no single-game/parlay distinction in its listing API,
/// so filtering is team-match confidence only (§4.2).
pub async fn find_moneyline_market(
    sport: Sport,
    home_team: &str,
    away_team: &str,
    min_confidence: f64,
) -> Result<Vec<MarketIds>> {
    let client = reqwest::Client::new();
    let markets: Vec<GammaMarket> = client
        .get(format!("{GAMMA_BASE_URL}/markets"))
        .query(&[("active", "true"), ("closed", "false")])
        .send()
        .await?
        .json()
        .await?;

    let mut matches = Vec::new();
    for market in markets {
        let m = contextual_score(home_team, away_team, &market.question, sport);
        if m.confidence >= min_confidence {
            matches.push(MarketIds {
                platform: Platform::Polymarket,
                market_id: market.condition_id,
                contract_team: home_team.to_string(),
            });
        }
    }
    Ok(matches)
}
