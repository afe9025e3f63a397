use crate::domain::MarketPrice;
use crate::error::Result;

use super::Pool;

/// Time-series insert, §3. Feeds the analytics replay path; the hot
/// trading path never reads prices back from here.
pub async fn insert_market_price(pool: &Pool, price: &MarketPrice) -> Result<()> {
    sqlx::query(
        r"
        INSERT INTO market_prices (
            game_id, platform, contract_team, yes_bid, yes_ask,
            yes_bid_size, yes_ask_size, timestamp, publisher_seq
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ",
    )
    .bind(&price.game_id)
    .bind(serde_json::to_value(price.platform)?.as_str().unwrap_or_default())
    .bind(&price.contract_team)
    .bind(price.yes_bid)
    .bind(price.yes_ask)
    .bind(price.yes_bid_size)
    .bind(price.yes_ask_size)
    .bind(price.timestamp)
    .bind(price.publisher_seq as i64)
    .execute(pool)
    .await?;
    Ok(())
}
