use serde_json::Value;

use crate::domain::{RuleAction, TradingRule, TradingSignal};

use super::RejectReason;

/// Evaluates the active trading rules against a signal (§4.5 supplemental).
/// A matching `Reject` short-circuits; otherwise the highest matching
/// `OverrideMinEdge` threshold (same fractional units as `EdgeConfig`) wins
/// and is checked against the signal's own edge.
pub fn evaluate_rules(signal: &TradingSignal, rules: &[TradingRule]) -> Result<(), RejectReason> {
    let mut best_override: Option<(f64, String)> = None;

    for rule in rules {
        if !matches_rule(rule, signal) {
            continue;
        }
        match &rule.action {
            RuleAction::Reject => return Err(RejectReason::RuleRejected(rule.rule_id.clone())),
            RuleAction::OverrideMinEdge { min_edge_pct } => {
                if best_override.as_ref().is_none_or(|(b, _)| *min_edge_pct > *b) {
                    best_override = Some((*min_edge_pct, rule.rule_id.clone()));
                }
            }
        }
    }

    if let Some((min_edge_pct, rule_id)) = best_override {
        if signal.edge_pct.abs() < min_edge_pct * 100.0 {
            return Err(RejectReason::BelowOverrideEdge(rule_id));
        }
    }
    Ok(())
}

fn matches_rule(rule: &TradingRule, signal: &TradingSignal) -> bool {
    rule.conditions.iter().all(|(key, value)| condition_holds(key, value, signal))
}

fn condition_holds(key: &str, value: &Value, signal: &TradingSignal) -> bool {
    if let Some(field) = key.strip_suffix("_lt") {
        return numeric_cmp(field, signal, value, |s, v| s < v);
    }
    if let Some(field) = key.strip_suffix("_lte") {
        return numeric_cmp(field, signal, value, |s, v| s <= v);
    }
    if let Some(field) = key.strip_suffix("_gt") {
        return numeric_cmp(field, signal, value, |s, v| s > v);
    }
    if let Some(field) = key.strip_suffix("_gte") {
        return numeric_cmp(field, signal, value, |s, v| s >= v);
    }
    exact_match(key, signal, value)
}

fn numeric_field(field: &str, signal: &TradingSignal) -> Option<f64> {
    match field {
        "edge_pct" => Some(signal.edge_pct),
        "model_prob" => Some(signal.model_prob),
        _ => None,
    }
}

fn numeric_cmp(field: &str, signal: &TradingSignal, value: &Value, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (numeric_field(field, signal), value.as_f64()) {
        (Some(s), Some(v)) => cmp(s, v),
        _ => false,
    }
}

fn exact_match(key: &str, signal: &TradingSignal, value: &Value) -> bool {
    let signal_value = match key {
        "sport" => Value::String(signal.sport.as_str().to_string()),
        "signal_type" => serde_json::to_value(signal.signal_type).unwrap_or(Value::Null),
        "direction" => serde_json::to_value(signal.direction).unwrap_or(Value::Null),
        "team" => Value::String(signal.team.clone()),
        "game_id" => Value::String(signal.game_id.clone()),
        _ => return true,
    };
    match (signal_value.as_str(), value.as_str()) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => signal_value == *value,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::domain::{Direction, Platform, Sport};

    use super::*;

    fn signal(edge_pct: f64) -> TradingSignal {
        let mut s = TradingSignal::new(
            "g1",
            Sport::NBA,
            "LAL",
            Direction::Buy,
            crate::domain::SignalType::ModelEdgeYes,
            0.6,
            Some(0.5),
            Some(Platform::Paper),
            Some(0.5),
            500.0,
            0.9,
        );
        s.edge_pct = edge_pct;
        s
    }

    fn rule(conditions: HashMap<String, Value>, action: RuleAction) -> TradingRule {
        TradingRule { rule_id: "r1".into(), conditions, action, expires_at: None, active: true }
    }

    #[test]
    fn reject_rule_short_circuits() {
        let mut conditions = HashMap::new();
        conditions.insert("team".to_string(), Value::String("LAL".into()));
        let rules = vec![rule(conditions, RuleAction::Reject)];
        assert!(matches!(evaluate_rules(&signal(10.0), &rules), Err(RejectReason::RuleRejected(_))));
    }

    #[test]
    fn override_raises_threshold() {
        let mut conditions = HashMap::new();
        conditions.insert("team".to_string(), Value::String("LAL".into()));
        let rules = vec![rule(conditions, RuleAction::OverrideMinEdge { min_edge_pct: 0.20 })];
        assert!(matches!(evaluate_rules(&signal(10.0), &rules), Err(RejectReason::BelowOverrideEdge(_))));
        assert!(evaluate_rules(&signal(25.0), &rules).is_ok());
    }

    #[test]
    fn numeric_operator_suffix_gates_match() {
        let mut conditions = HashMap::new();
        conditions.insert("edge_pct_gte".to_string(), serde_json::json!(20.0));
        let rules = vec![rule(conditions, RuleAction::Reject)];
        assert!(evaluate_rules(&signal(10.0), &rules).is_ok());
        assert!(evaluate_rules(&signal(25.0), &rules).is_err());
    }
}
