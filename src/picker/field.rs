//! Layer 1: the attached records as held by the enclosing form

use serde_json::{json, Value};

use crate::domain::record::is_tombstone;
use crate::domain::{Cardinality, Record, RecordId, SchemaNode};

/// Current value of a relationship picker, always held as an array
///
/// Tombstoned items (`_destroy: 1`) stay in the value so the backend can
/// detach them, but are never displayed.
#[derive(Clone, Debug, PartialEq)]
pub struct PickerField {
    cardinality: Cardinality,
    items: Vec<Value>,
}

impl PickerField {
    pub fn new(cardinality: Cardinality, value: Value) -> Self {
        let items = match value {
            Value::Null => Vec::new(),
            Value::Array(items) => items,
            Value::Object(_) => vec![value],
            other => {
                tracing::warn!("Ignoring non-record picker value {}", other);
                Vec::new()
            }
        };
        Self { cardinality, items }
    }

    /// Field for a RELATIONSHIP_PICKER node; cardinality defaults to `many`
    pub fn from_node(node: &SchemaNode, value: Value) -> Self {
        Self::new(node.cardinality.unwrap_or(Cardinality::Many), value)
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// Raw items, tombstones included
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    /// Displayed items with their position in the raw array
    pub fn visible_items(&self) -> Vec<(usize, Record)> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| !is_tombstone(item))
            .filter_map(|(index, item)| {
                Record::from_value(item.clone()).map(|record| (index, record))
            })
            .collect()
    }

    pub fn live_count(&self) -> usize {
        self.items.iter().filter(|item| !is_tombstone(item)).count()
    }

    /// `one` accepts a record only while none is attached
    pub fn can_add(&self) -> bool {
        match self.cardinality {
            Cardinality::Many => true,
            Cardinality::One => self.live_count() == 0,
        }
    }

    /// Remove the item at raw `index`
    ///
    /// Persisted items are tombstoned in place; unsaved items are dropped.
    pub fn remove(&mut self, index: usize) -> bool {
        let Some(item) = self.items.get_mut(index) else {
            return false;
        };
        if is_tombstone(item) {
            return false;
        }

        let persisted = item.get("id").map(|id| !id.is_null()).unwrap_or(false);
        if let (true, Value::Object(object)) = (persisted, item) {
            object.insert("_destroy".to_string(), json!(1));
            return true;
        }
        self.items.remove(index);
        true
    }

    /// Attach the records confirmed in the select drawer
    ///
    /// `many` appends records not already attached; a tombstoned match is
    /// revived in place. `one` replaces the value with the first record.
    pub fn apply_confirm(&mut self, records: Vec<Record>) {
        match self.cardinality {
            Cardinality::One => {
                if let Some(record) = records.into_iter().next() {
                    self.items = vec![record.to_value()];
                }
            }
            Cardinality::Many => {
                for record in records {
                    match record.id.as_ref().and_then(|id| self.position_of(id)) {
                        Some(index) => {
                            if let Value::Object(object) = &mut self.items[index] {
                                object.remove("_destroy");
                            }
                        }
                        None => self.items.push(record.to_value()),
                    }
                }
            }
        }
    }

    fn position_of(&self, id: &RecordId) -> Option<usize> {
        self.items.iter().position(|item| {
            item.get("id")
                .and_then(|raw| serde_json::from_value::<RecordId>(raw.clone()).ok())
                .as_ref()
                == Some(id)
        })
    }

    /// Value written back to the form: an object or null for `one`, an array for `many`
    pub fn value(&self) -> Value {
        match self.cardinality {
            Cardinality::Many => Value::Array(self.items.clone()),
            Cardinality::One => self
                .items
                .iter()
                .find(|item| !is_tombstone(item))
                .or_else(|| self.items.first())
                .cloned()
                .unwrap_or(Value::Null),
        }
    }
}
