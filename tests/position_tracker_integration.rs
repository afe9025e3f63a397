//! End-to-end position tracker test against a live Postgres + Redis.
//!
//! Requires `DATABASE_URL`/`REDIS_URL` pointed at a disposable database with
//! migrations applied, and no other network access (paper trading only).
//!
//! ```bash
//! cargo test --features integration-tests --test position_tracker_integration -- --ignored
//! ```

#![cfg(feature = "integration-tests")]

use std::sync::Arc;
use std::time::Duration;

use edgelord::domain::{Direction, ExecutionResult, ExecutionStatus, Platform, Side};
use edgelord::messaging::{topics, HotBus};
use edgelord::position_tracker::PositionTracker;
use edgelord::store;
use edgelord::testkit::{config, domain};

async fn bus(source: &str) -> HotBus {
    let redis_url = std::env::var("REDIS_URL").expect("REDIS_URL must be set");
    HotBus::connect(&redis_url, source.to_string()).await.unwrap()
}

async fn pool() -> store::Pool {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    store::create_pool(&database_url).await.unwrap()
}

#[tokio::test]
#[ignore]
async fn entry_fill_opens_a_position_and_orphan_sweep_settles_it() {
    let game_id = format!("itest-{}", uuid::Uuid::new_v4());
    let pool = pool().await;

    let game = domain::game(&game_id, "Los Angeles Lakers", "Boston Celtics");
    store::upsert_game(&pool, &game).await.unwrap();

    let tracker = Arc::new(
        PositionTracker::new("itest", config::fast(), bus("position-tracker-itest").await, pool.clone())
            .await
            .unwrap(),
    );
    let handle = tokio::spawn(tracker.clone().run());

    let publisher = bus("publisher-itest").await;
    let request_id = uuid::Uuid::new_v4().to_string();
    let fill = ExecutionResult {
        request_id: request_id.clone(),
        idempotency_key: format!("{game_id}:Lakers:buy"),
        status: ExecutionStatus::Filled,
        order_id: Some("itest-order".to_string()),
        filled_qty: 10.0,
        avg_price: 0.5,
        entry_fees: edgelord::domain::Cents(0),
        error: None,
        platform: Platform::Paper,
        game_id: game_id.clone(),
        market_id: "m1".to_string(),
        contract_team: "Lakers".to_string(),
        side: Side::Yes,
        action: Direction::Buy,
        requested_at: chrono::Utc::now(),
        executed_at: chrono::Utc::now(),
        latency_ms: 5.0,
    };
    publisher.publish(&topics::execution_result(&request_id), &fill).await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    let positions = store::load_open_positions(&pool).await.unwrap();
    assert!(positions.iter().any(|p| p.game_id == game_id), "entry fill did not open a position");

    let mut final_game = domain::final_game(&game_id, "Los Angeles Lakers", "Boston Celtics");
    final_game.sport = game.sport;
    store::upsert_game(&pool, &final_game).await.unwrap();
    store::insert_game_state(&pool, &domain::game_state(&game_id, 110, 100)).await.unwrap();

    tokio::time::sleep(Duration::from_secs(2)).await;
    let remaining = store::load_open_positions(&pool).await.unwrap();
    assert!(
        !remaining.iter().any(|p| p.game_id == game_id),
        "position should have settled once the game went final"
    );

    handle.abort();
}
