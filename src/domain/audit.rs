use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only audit row, §3: "No logical information leaves the system
/// without an audit row." `old`/`new` are JSONB snapshots of the affected row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOp {
    BankrollUpdate,
    TradeOpened,
    TradeClosed,
    TradeSettled,
    OrphanSettlement,
    RuleDeleted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub op: AuditOp,
    pub timestamp: DateTime<Utc>,
    pub old: Option<serde_json::Value>,
    pub new: Option<serde_json::Value>,
}

impl AuditRecord {
    #[must_use]
    pub fn new(op: AuditOp, old: Option<serde_json::Value>, new: Option<serde_json::Value>) -> Self {
        Self {
            op,
            timestamp: Utc::now(),
            old,
            new,
        }
    }
}
