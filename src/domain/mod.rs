//! Pure data model (§3). No I/O, no async; every type here is `Serialize` +
//! `Deserialize` so it can cross the hot plane unchanged.

mod audit;
mod bankroll;
mod execution;
mod game;
mod market;
mod money;
mod position;
mod rule;
mod signal;
mod trade_event;
mod types;

pub use audit::{AuditOp, AuditRecord};
pub use bankroll::Bankroll;
pub use execution::{idempotency_key, ExecutionRequest, ExecutionResult, ExecutionStatus};
pub use game::{Game, GameState, GameStatus};
pub use market::MarketPrice;
pub use money::Cents;
pub use position::{Outcome, PositionStatus, OpenPosition};
pub use rule::{RuleAction, TradingRule};
pub use signal::{SignalType, TradingSignal};
pub use trade_event::TradeClosedEvent;
pub use types::{Direction, Platform, Side, Sport};
