//! Rule resolution: decides whether a node is visible and enabled
//!
//! Resolution starts from `visible = enabled = true` and every rule can only
//! narrow a flag to `false`. A SHOW or ENABLE rule never restores a flag an
//! earlier rule cleared.

use serde_json::Value;

use crate::domain::{Condition, Effect, Operator, Rule};

/// Outcome of resolving a node's rules against data
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub visible: bool,
    pub enabled: bool,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            visible: true,
            enabled: true,
        }
    }
}

/// Resolve `rules` in order against a flat data record
pub fn resolve(rules: &[Rule], data: &Value) -> Resolution {
    let mut resolution = Resolution::default();

    for rule in rules {
        let holds = rule.conditions.iter().all(|c| evaluate(c, data));
        match rule.effect {
            Effect::Hide if holds => resolution.visible = false,
            Effect::Show if !holds => resolution.visible = false,
            Effect::Disable if holds => resolution.enabled = false,
            Effect::Enable if !holds => resolution.enabled = false,
            _ => {}
        }
    }

    resolution
}

/// Evaluate one condition against `data[condition.field]`
///
/// A missing key is treated as undefined: it satisfies NULL and EMPTY and is
/// never a member of `values`.
pub fn evaluate(condition: &Condition, data: &Value) -> bool {
    let value = data.get(condition.field.as_str());
    let values = &condition.values;

    match condition.operator {
        Operator::Eq | Operator::In => is_member(value, values),
        Operator::Neq | Operator::Nin => !is_member(value, values),
        Operator::Lt => compare(value, values, |a, b| a < b),
        Operator::Lte => compare(value, values, |a, b| a <= b),
        Operator::Gt => compare(value, values, |a, b| a > b),
        Operator::Gte => compare(value, values, |a, b| a >= b),
        Operator::Null => is_nullish(value),
        Operator::Nnull => !is_nullish(value),
        Operator::Contains => match value {
            Some(Value::String(haystack)) => values
                .iter()
                .filter_map(Value::as_str)
                .any(|needle| haystack.contains(needle)),
            _ => false,
        },
        Operator::Empty => is_empty(value),
        Operator::Nempty => !is_empty(value),
    }
}

fn is_nullish(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

fn is_member(value: Option<&Value>, values: &[Value]) -> bool {
    match value {
        Some(value) => values.iter().any(|candidate| loosely_equal(value, candidate)),
        None => false,
    }
}

/// Structural equality where numbers compare by value (`1 == 1.0`)
fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}

fn compare(value: Option<&Value>, values: &[Value], cmp: fn(f64, f64) -> bool) -> bool {
    let lhs = value.and_then(|v| if v.is_number() { v.as_f64() } else { None });
    let rhs = values
        .first()
        .and_then(|v| if v.is_number() { v.as_f64() } else { None });

    match (lhs, rhs) {
        (Some(lhs), Some(rhs)) => cmp(lhs, rhs),
        _ => false,
    }
}
