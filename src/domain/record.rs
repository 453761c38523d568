//! External record contract consumed by the relationship picker
//!
//! Records live in an external persistence layer. The picker only needs two
//! verbs from it: a paginated list with an optional search term, and create.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Records
// ============================================================================

/// Identifier assigned by the persistence layer (numeric or opaque string)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Str(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{}", id),
            RecordId::Str(id) => f.write_str(id),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId::Int(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId::Str(value.to_string())
    }
}

/// One item of the record contract: `{id, data: {...}}`
///
/// `_destroy: 1` marks a persisted item as removed from its association
/// while keeping it in the submitted value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(rename = "_destroy", default, skip_serializing_if = "Option::is_none")]
    pub destroy: Option<u8>,
}

impl Record {
    pub fn new(id: Option<RecordId>, data: Map<String, Value>) -> Self {
        Self {
            id,
            data,
            destroy: None,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroy.unwrap_or(0) != 0
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Build a record from a form value
    ///
    /// Accepts the contract shape `{id, data}` as well as flat objects such as
    /// `{id, first_name}`, whose remaining keys become `data`.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut object) = value else {
            return None;
        };

        let id = object
            .remove("id")
            .and_then(|id| serde_json::from_value::<Option<RecordId>>(id).ok())
            .flatten();
        let destroy = object
            .remove("_destroy")
            .filter(destroy_flag_set)
            .map(|_| 1);
        let data = match object.remove("data") {
            Some(Value::Object(data)) if object.is_empty() => data,
            Some(other) => {
                object.insert("data".to_string(), other);
                object
            }
            None => object,
        };

        Some(Self { id, data, destroy })
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Whether a raw `_destroy` value marks its item as removed
pub fn destroy_flag_set(flag: &Value) -> bool {
    match flag {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().unwrap_or(0.0) > 0.0,
        Value::String(s) => s == "1" || s == "true",
        _ => false,
    }
}

/// Whether a raw item carries a set `_destroy` flag
pub fn is_tombstone(item: &Value) -> bool {
    item.get("_destroy").map(destroy_flag_set).unwrap_or(false)
}

// ============================================================================
// List Contract
// ============================================================================

/// Query parameters of `GET {path}?page&per_page&q`
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListQuery {
    pub page: u32,
    pub per_page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
}

impl ListQuery {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page,
            per_page,
            q: None,
        }
    }

    /// Attach a search term; blank terms are dropped
    pub fn with_search(mut self, q: Option<&str>) -> Self {
        self.q = q
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_string);
        self
    }

    /// Request path with encoded query string, e.g. `/contacts?page=1&per_page=10&q=ann`
    pub fn to_url(&self, path: &str) -> String {
        let mut url = format!("{}?page={}&per_page={}", path, self.page, self.per_page);
        if let Some(q) = &self.q {
            url.push_str("&q=");
            url.push_str(&urlencoding::encode(q));
        }
        url
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    pub total_pages: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub data: Vec<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

// ============================================================================
// Port
// ============================================================================

/// Errors reported by a record endpoint
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RecordError {
    /// Transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the contract
    #[error("Parse error: {0}")]
    Parse(String),

    /// Unknown collection
    #[error("Collection not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for RecordError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RecordError::Parse(err.to_string())
        } else if err.is_connect() {
            RecordError::Network(format!("Connection error: {}", err))
        } else {
            RecordError::Network(err.to_string())
        }
    }
}

pub type RecordResult<T> = Result<T, RecordError>;

/// List/create access to an external record collection
#[async_trait]
pub trait RecordPort: Send + Sync {
    /// `GET {path}?page&per_page[&q]`
    async fn list(&self, path: &str, query: &ListQuery) -> RecordResult<ListResponse>;

    /// `POST {path}` with `{data}`; returns the created record with its id
    async fn create(&self, path: &str, data: Map<String, Value>) -> RecordResult<Record>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_query_url() {
        let query = ListQuery::new(1, 10).with_search(Some("ann lee"));
        assert_eq!(query.to_url("/contacts"), "/contacts?page=1&per_page=10&q=ann%20lee");

        let blank = ListQuery::new(2, 25).with_search(Some("  "));
        assert_eq!(blank.to_url("/contacts"), "/contacts?page=2&per_page=25");
    }

    #[test]
    fn test_record_from_contract_shape() {
        let record = Record::from_value(json!({"id": 7, "data": {"name": "Ann"}})).unwrap();
        assert_eq!(record.id, Some(RecordId::Int(7)));
        assert_eq!(record.data.get("name"), Some(&json!("Ann")));
        assert!(!record.is_destroyed());
    }

    #[test]
    fn test_record_from_flat_object() {
        let record =
            Record::from_value(json!({"id": "c-1", "name": "Ann", "_destroy": 1})).unwrap();
        assert_eq!(record.id, Some(RecordId::Str("c-1".into())));
        assert_eq!(record.data.get("name"), Some(&json!("Ann")));
        assert!(record.is_destroyed());
        assert_eq!(
            record.to_value(),
            json!({"id": "c-1", "data": {"name": "Ann"}, "_destroy": 1})
        );
    }

    #[test]
    fn test_record_without_id_is_not_persisted() {
        let record = Record::from_value(json!({"data": {"name": "New"}})).unwrap();
        assert!(!record.is_persisted());
        assert!(Record::from_value(json!("nope")).is_none());
    }
}
