//! Live form state read and written by INPUT_* fields

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Values, errors and touched flags of one form
///
/// Keys are dotted binding paths (`spouse_attributes.first_name`,
/// `addresses_attributes.0.city`); numeric segments index arrays.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FormState {
    #[serde(default = "empty_object")]
    values: Value,
    #[serde(default)]
    errors: BTreeMap<String, String>,
    #[serde(default)]
    touched: BTreeSet<String>,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl FormState {
    pub fn new() -> Self {
        Self::with_values(empty_object())
    }

    pub fn with_values(values: Value) -> Self {
        let values = if values.is_object() { values } else { empty_object() };
        Self {
            values,
            errors: BTreeMap::new(),
            touched: BTreeSet::new(),
        }
    }

    pub fn values(&self) -> &Value {
        &self.values
    }

    pub fn into_values(self) -> Value {
        self.values
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        lookup_path(&self.values, path)
    }

    /// Write `value` at `path`, creating intermediate objects and arrays
    pub fn set_value(&mut self, path: &str, value: Value) {
        if !self.values.is_object() {
            self.values = empty_object();
        }
        let mut current = &mut self.values;
        let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();

        for (i, segment) in segments.iter().enumerate() {
            let last = i + 1 == segments.len();
            let next_is_index = segments
                .get(i + 1)
                .map(|next| next.parse::<usize>().is_ok())
                .unwrap_or(false);
            let placeholder = || if next_is_index { Value::Array(vec![]) } else { empty_object() };

            current = match current {
                Value::Array(items) => {
                    let Ok(index) = segment.parse::<usize>() else {
                        tracing::warn!(
                            "Cannot set '{}': '{}' is not an array index",
                            path,
                            segment
                        );
                        return;
                    };
                    while items.len() <= index {
                        items.push(Value::Null);
                    }
                    if last {
                        items[index] = value;
                        return;
                    }
                    if !(items[index].is_object() || items[index].is_array()) {
                        items[index] = placeholder();
                    }
                    &mut items[index]
                }
                Value::Object(map) => {
                    if last {
                        map.insert(segment.to_string(), value);
                        return;
                    }
                    let entry = map.entry(segment.to_string()).or_insert_with(placeholder);
                    if !(entry.is_object() || entry.is_array()) {
                        *entry = placeholder();
                    }
                    entry
                }
                other => {
                    *other = empty_object();
                    return self.set_value(path, value);
                }
            };
        }
    }

    /// Apply a change event from a bound control
    pub fn apply_change(&mut self, path: &str, value: Value) {
        self.set_value(path, value);
        self.touched.insert(path.to_string());
        self.errors.remove(path);
    }

    pub fn is_touched(&self, path: &str) -> bool {
        self.touched.contains(path)
    }

    pub fn error(&self, path: &str) -> Option<&str> {
        self.errors.get(path).map(String::as_str)
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn set_error(&mut self, path: &str, message: impl Into<String>) {
        self.errors.insert(path.to_string(), message.into());
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Read `data[path]`, trying the literal key before walking dotted segments
pub fn lookup_path<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    if let Some(value) = data.get(path) {
        return Some(value);
    }
    path.split('.').try_fold(data, |current, segment| match current {
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        Value::Object(map) => map.get(segment),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_value_creates_nested_objects_and_arrays() {
        let mut form = FormState::new();
        form.set_value("spouse_attributes.first_name", json!("Ann"));
        form.set_value("addresses_attributes.1.city", json!("Oslo"));

        assert_eq!(
            form.values(),
            &json!({
                "spouse_attributes": {"first_name": "Ann"},
                "addresses_attributes": [null, {"city": "Oslo"}]
            })
        );
        assert_eq!(form.get("addresses_attributes.1.city"), Some(&json!("Oslo")));
        assert_eq!(form.get("addresses_attributes.0.city"), None);
    }

    #[test]
    fn test_lookup_prefers_literal_keys() {
        let data = json!({"a.b": 1, "a": {"b": 2}});
        assert_eq!(lookup_path(&data, "a.b"), Some(&json!(1)));
        assert_eq!(lookup_path(&json!({"a": {"b": 2}}), "a.b"), Some(&json!(2)));
    }

    #[test]
    fn test_apply_change_touches_and_clears_error() {
        let mut form = FormState::new();
        form.set_error("email", "can't be blank");
        form.apply_change("email", json!("ann@example.com"));

        assert!(form.is_touched("email"));
        assert!(form.error("email").is_none());
        assert_eq!(form.get("email"), Some(&json!("ann@example.com")));
    }

    #[test]
    fn test_set_value_replaces_scalars_on_the_path() {
        let mut form = FormState::with_values(json!({"spouse_attributes": "oops"}));
        form.set_value("spouse_attributes.first_name", json!("Ann"));
        assert_eq!(form.get("spouse_attributes.first_name"), Some(&json!("Ann")));
    }
}
