use crate::config::{LiquidityConfig, RiskConfig};
use crate::domain::{Bankroll, Cents, OpenPosition, TradingSignal};
use crate::error::Result;
use crate::store::{self, Pool};

use super::RejectReason;

/// The seven store-backed risk checks, executed concurrently and joined
/// (§4.5). `proposed_cost` is the notional the signal would commit if sized.
pub struct RiskInputs<'a> {
    pub signal: &'a TradingSignal,
    pub proposed_cost: Cents,
    pub bankroll: &'a Bankroll,
    pub existing_same_team: Option<&'a OpenPosition>,
}

pub async fn run_risk_checks(
    pool: &Pool,
    risk: &RiskConfig,
    liquidity: &LiquidityConfig,
    inputs: RiskInputs<'_>,
) -> Result<Result<(), RejectReason>> {
    let game_id = inputs.signal.game_id.clone();
    let sport = inputs.signal.sport;

    let (daily_loss, game_exposure, sport_exposure, open_count) = tokio::try_join!(
        store::total_daily_loss_cents(pool),
        store::game_exposure_cents(pool, &game_id),
        store::sport_exposure_cents(pool, sport),
        store::open_position_count_for_game(pool, &game_id),
    )?;

    if inputs.bankroll.current_balance < inputs.proposed_cost {
        return Ok(Err(RejectReason::InsufficientBalance));
    }

    if Cents(-daily_loss) > risk.max_daily_loss {
        return Ok(Err(RejectReason::DailyLossExceeded));
    }

    if risk.max_game_exposure.0 >= 0 && Cents(game_exposure) + inputs.proposed_cost > risk.max_game_exposure {
        return Ok(Err(RejectReason::GameExposureExceeded));
    }

    if Cents(sport_exposure) + inputs.proposed_cost > risk.max_sport_exposure {
        return Ok(Err(RejectReason::SportExposureExceeded));
    }

    if let Some(existing) = inputs.existing_same_team {
        if existing.side != inputs.signal.direction.side() {
            return Ok(Err(RejectReason::OpposingPosition));
        }
    }

    if open_count >= 2 {
        return Ok(Err(RejectReason::TooManyOpenPositions));
    }

    let suffix = inputs
        .signal
        .platform_buy
        .map(|p| format!("{p:?}").to_ascii_uppercase())
        .unwrap_or_default();
    let min_liquidity = liquidity.min_threshold_for(&suffix)?;
    if inputs.signal.liquidity_available < min_liquidity {
        return Ok(Err(RejectReason::InsufficientLiquidity));
    }

    Ok(Ok(()))
}
