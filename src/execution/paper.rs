use chrono::Utc;

use crate::domain::{Cents, ExecutionRequest, ExecutionResult, ExecutionStatus};

/// Simulated fill at the requested limit price with zero latency (§4.6):
/// always `Filled`, entry fees charged at the platform's per-side rate
/// (Paper mirrors Kalshi, §4.7).
#[must_use]
pub fn execute(request: &ExecutionRequest) -> ExecutionResult {
    let now = Utc::now();
    let notional = Cents::from_price_and_size(request.limit_price, request.size);
    let entry_fees = Cents::from_fraction_of(request.platform.per_side_fee_pct(), notional);
    ExecutionResult {
        request_id: request.request_id.clone(),
        idempotency_key: request.idempotency_key.clone(),
        status: ExecutionStatus::Filled,
        order_id: Some(format!("paper-{}", uuid::Uuid::new_v4())),
        filled_qty: request.size,
        avg_price: request.limit_price,
        entry_fees,
        error: None,
        platform: request.platform,
        game_id: request.game_id.clone(),
        market_id: request.market_id.clone(),
        contract_team: request.contract_team.clone(),
        side: request.side,
        action: request.action,
        requested_at: request.created_at,
        executed_at: now,
        latency_ms: (now - request.created_at).num_milliseconds() as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Direction, Platform, Side, Sport};

    fn request() -> ExecutionRequest {
        ExecutionRequest {
            request_id: "r1".into(),
            idempotency_key: "g1:LAL:buy".into(),
            game_id: "g1".into(),
            sport: Sport::NBA,
            signal_id: "s1".into(),
            platform: Platform::Paper,
            market_id: "m1".into(),
            contract_team: "LAL".into(),
            side: Side::Yes,
            action: Direction::Buy,
            limit_price: 0.62,
            size: 100.0,
            edge_pct: 13.0,
            model_prob: 0.74,
            market_prob: Some(0.61),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn fills_at_the_requested_limit_price() {
        let result = execute(&request());
        assert_eq!(result.status, ExecutionStatus::Filled);
        assert_eq!(result.filled_qty, 100.0);
        assert!((result.avg_price - 0.62).abs() < 1e-9);
    }

    #[test]
    fn charges_entry_fees_at_the_platform_per_side_rate() {
        let result = execute(&request());
        // notional = 0.62 * 100 = 6200 cents, 0.7% per side = 43.4 -> 43 cents rounded.
        assert_eq!(result.entry_fees.0, 43);
    }
}
