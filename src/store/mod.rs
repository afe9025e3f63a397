//! Relational + time-series store access (§3, §6). Backed by Postgres with
//! hypertable-style retention on the time-series tables; accessed through a
//! single shared pool per process (§5 shared-resource policy, ~10 connections).

mod audit;
mod bankroll;
mod game_states;
mod games;
mod market_prices;
mod positions;
mod rules;

pub use audit::record_audit;
pub use bankroll::{load_bankroll, update_bankroll};
pub use game_states::{insert_game_state, latest_game_state};
pub use games::{games_in_terminal_state, get_game, upsert_game};
pub use market_prices::insert_market_price;
pub use positions::{
    game_exposure_cents, insert_open_position, load_open_positions, open_position_count_for_game,
    open_position_for_team, sport_exposure_cents, total_daily_loss_cents, update_closed_position,
};
pub use rules::load_active_rules;

use sqlx::postgres::PgPoolOptions;

use crate::error::Result;

pub type Pool = sqlx::PgPool;

/// One shared pool per process, §5: "one shared connection pool per process
/// (~10 connections)".
pub async fn create_pool(database_url: &str) -> Result<Pool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    Ok(pool)
}
