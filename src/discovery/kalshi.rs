use serde::Deserialize;

use super::team_match::contextual_score;
use super::MarketIds;
use crate::domain::{Platform, Sport};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarketType {
    Moneyline,
    Spread,
    Total,
}

/// Excludes multi-game/parlay tickers before matching is attempted
/// (supplemental §4.2), grounded on the teacher's `is_single_game_market`.
fn is_single_game_market(ticker: &str, title: &str) -> bool {
    let upper = ticker.to_ascii_uppercase();
    let title_upper = title.to_ascii_uppercase();
    if upper.contains("MULTIGAME") || upper.contains("PARLAY") || title_upper.contains("PARLAY") {
        return false;
    }
    upper.contains("SINGLEGAME") || upper.contains("FLOORGAME") || known_series_prefix(&upper)
}

fn known_series_prefix(upper_ticker: &str) -> bool {
    const PREFIXES: &[&str] = &["NFLGAME", "NBAGAME", "NHLGAME", "MLBGAME", "CFBGAME", "CBBGAME"];
    PREFIXES.iter().any(|p| upper_ticker.starts_with(p))
}

/// Keyword heuristic for market type detection, grounded on the teacher's
/// `detect_market_type`.
fn detect_market_type(title: &str) -> MarketType {
    let lower = title.to_ascii_lowercase();
    if lower.contains("spread") || lower.contains("handicap") || lower.contains("cover") {
        MarketType::Spread
    } else if lower.contains("total") || lower.contains("over") || lower.contains("under") || lower.contains("o/u") {
        MarketType::Total
    } else {
        MarketType::Moneyline
    }
}

#[derive(Debug, Deserialize)]
struct KalshiMarket {
    ticker: String,
    title: String,
}

#[derive(Debug, Deserialize)]
struct KalshiMarketsResponse {
    markets: Vec<KalshiMarket>,
}

/// Queries the Kalshi markets listing and resolves moneyline candidates
/// for (sport, home, away), requiring both sides to match at
/// `min_confidence` (§4.2).
pub async fn find_moneyline_market(
    sport: Sport,
    home_team: &str,
    away_team: &str,
    min_confidence: f64,
) -> Result<Vec<MarketIds>> {
    let base_url = std::env::var("KALSHI_API_BASE")
        .unwrap_or_else(|_| "https://api.elections.kalshi.com/trade-api/v2".to_string());
    let client = reqwest::Client::new();
    let response: KalshiMarketsResponse = client
        .get(format!("{base_url}/markets"))
        .query(&[("status", "open")])
        .send()
        .await?
        .json()
        .await?;

    let mut matches = Vec::new();
    for market in response.markets {
        if !is_single_game_market(&market.ticker, &market.title) {
            continue;
        }
        if detect_market_type(&market.title) != MarketType::Moneyline {
            continue;
        }
        let home_match = contextual_score(home_team, away_team, &market.title, sport);
        if home_match.confidence >= min_confidence {
            matches.push(MarketIds {
                platform: Platform::Kalshi,
                market_id: market.ticker,
                contract_team: home_team.to_string(),
            });
        }
    }
    Ok(matches)
}
