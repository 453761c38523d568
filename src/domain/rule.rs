//! Declarative visibility and enablement rules

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a rule does to its node when evaluated
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Effect {
    Hide,
    Show,
    Disable,
    Enable,
}

/// Comparison applied between `data[field]` and the condition values
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    Nin,
    Null,
    Nnull,
    Contains,
    Empty,
    Nempty,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    #[serde(default)]
    pub values: Vec<Value>,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: Operator, values: Vec<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            values,
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::Eq, vec![value.into()])
    }

    pub fn neq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::Neq, vec![value.into()])
    }

    pub fn empty(field: impl Into<String>) -> Self {
        Self::new(field, Operator::Empty, vec![])
    }
}

/// A single effect guarded by AND-combined conditions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub effect: Effect,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl Rule {
    pub fn new(effect: Effect, conditions: Vec<Condition>) -> Self {
        Self { effect, conditions }
    }

    pub fn hide(condition: Condition) -> Self {
        Self::new(Effect::Hide, vec![condition])
    }

    pub fn show(condition: Condition) -> Self {
        Self::new(Effect::Show, vec![condition])
    }

    pub fn disable(condition: Condition) -> Self {
        Self::new(Effect::Disable, vec![condition])
    }

    pub fn enable(condition: Condition) -> Self {
        Self::new(Effect::Enable, vec![condition])
    }

    /// Add another condition that must also hold
    pub fn and(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rule_wire_format() {
        let rule = Rule::hide(Condition::neq("role", "admin"));
        assert_eq!(
            serde_json::to_value(&rule).unwrap(),
            json!({
                "effect": "HIDE",
                "conditions": [{"field": "role", "operator": "NEQ", "values": ["admin"]}]
            })
        );
    }

    #[test]
    fn test_operator_names_parse() {
        let parsed: Vec<Operator> =
            serde_json::from_value(json!(["NNULL", "NEMPTY", "LTE", "NIN", "CONTAINS"])).unwrap();
        assert_eq!(
            parsed,
            vec![
                Operator::Nnull,
                Operator::Nempty,
                Operator::Lte,
                Operator::Nin,
                Operator::Contains
            ]
        );
    }
}
