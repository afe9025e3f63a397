use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleAction {
    Reject,
    OverrideMinEdge { min_edge_pct: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingRule {
    pub rule_id: String,
    pub conditions: HashMap<String, serde_json::Value>,
    pub action: RuleAction,
    pub expires_at: Option<DateTime<Utc>>,
    pub active: bool,
}

impl TradingRule {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| e <= now)
    }
}
