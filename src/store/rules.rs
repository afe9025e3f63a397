use chrono::Utc;

use crate::domain::{RuleAction, TradingRule};
use crate::error::Result;

use super::Pool;

#[derive(sqlx::FromRow)]
struct RuleRow {
    rule_id: String,
    conditions: serde_json::Value,
    action: serde_json::Value,
    expires_at: Option<chrono::DateTime<chrono::Utc>>,
    active: bool,
}

/// Active, unexpired rules only, for the signal processor's filter cache
/// (§4.5). Refreshed on a timer by the caller, not held open-ended.
pub async fn load_active_rules(pool: &Pool) -> Result<Vec<TradingRule>> {
    let rows: Vec<RuleRow> = sqlx::query_as(
        r"
        SELECT rule_id, conditions, action, expires_at, active
        FROM trading_rules
        WHERE active = true AND (expires_at IS NULL OR expires_at > now())
        ",
    )
    .fetch_all(pool)
    .await?;

    let now = Utc::now();
    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let conditions = serde_json::from_value(row.conditions).ok()?;
            let action: RuleAction = serde_json::from_value(row.action).ok()?;
            let rule = TradingRule {
                rule_id: row.rule_id,
                conditions,
                action,
                expires_at: row.expires_at,
                active: row.active,
            };
            if rule.is_expired(now) {
                None
            } else {
                Some(rule)
            }
        })
        .collect())
}
