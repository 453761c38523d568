//! In-process record collections implementing the list/create contract

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::{
    ListQuery, ListResponse, Pagination, Record, RecordError, RecordId, RecordPort, RecordResult,
};

/// Most recent requests kept in the log; older entries are dropped
pub const REQUEST_LOG_CAPACITY: usize = 256;

/// Collections keyed by resource path without slashes (`/contacts` -> `contacts`)
#[derive(Clone)]
pub struct InMemoryRecordStore {
    collections: Arc<RwLock<HashMap<String, Vec<Record>>>>,
    next_id: Arc<AtomicI64>,
    create_calls: Arc<AtomicUsize>,
    requests: Arc<RwLock<VecDeque<String>>>,
    fail_next: Arc<RwLock<Option<RecordError>>>,
}

fn collection_key(path: &str) -> String {
    path.trim_matches('/').to_string()
}

fn matches_search(record: &Record, q: &str) -> bool {
    let needle = q.to_lowercase();
    record.data.values().any(|value| match value {
        Value::String(s) => s.to_lowercase().contains(&needle),
        Value::Number(n) => n.to_string().contains(&needle),
        _ => false,
    })
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
            create_calls: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(RwLock::new(VecDeque::new())),
            fail_next: Arc::new(RwLock::new(None)),
        }
    }

    /// Insert records with fresh ids
    pub async fn seed(&self, path: &str, rows: Vec<Map<String, Value>>) -> Vec<RecordId> {
        let mut collections = self.collections.write().await;
        let collection = collections.entry(collection_key(path)).or_default();
        rows.into_iter()
            .map(|data| {
                let id = self.assign_id();
                collection.push(Record::new(Some(id.clone()), data));
                id
            })
            .collect()
    }

    /// Make the next list or create call fail with `error`
    pub async fn fail_next(&self, error: RecordError) {
        *self.fail_next.write().await = Some(error);
    }

    /// Number of create calls received, failed ones included
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Latest requests seen, oldest first, as `GET /path?query` or `POST /path`
    pub async fn requests(&self) -> Vec<String> {
        self.requests.read().await.iter().cloned().collect()
    }

    pub async fn len(&self, path: &str) -> usize {
        let collections = self.collections.read().await;
        collections.get(&collection_key(path)).map(Vec::len).unwrap_or(0)
    }

    fn assign_id(&self) -> RecordId {
        RecordId::Int(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn log_request(&self, line: String) {
        let mut requests = self.requests.write().await;
        if requests.len() == REQUEST_LOG_CAPACITY {
            requests.pop_front();
        }
        requests.push_back(line);
    }

    async fn take_failure(&self) -> Option<RecordError> {
        self.fail_next.write().await.take()
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordPort for InMemoryRecordStore {
    async fn list(&self, path: &str, query: &ListQuery) -> RecordResult<ListResponse> {
        self.log_request(format!("GET {}", query.to_url(path))).await;
        if let Some(error) = self.take_failure().await {
            return Err(error);
        }

        let collections = self.collections.read().await;
        let rows: Vec<&Record> = collections
            .get(&collection_key(path))
            .map(|rows| {
                rows.iter()
                    .filter(|r| {
                        query.q.as_deref().map(|q| matches_search(r, q)).unwrap_or(true)
                    })
                    .collect()
            })
            .unwrap_or_default();

        let per_page = query.per_page.max(1) as usize;
        let page = query.page.max(1) as usize;
        let total_pages = rows.len().div_ceil(per_page).max(1) as u32;
        let data = rows
            .into_iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .cloned()
            .collect();

        Ok(ListResponse {
            data,
            pagination: Some(Pagination { total_pages }),
        })
    }

    async fn create(&self, path: &str, data: Map<String, Value>) -> RecordResult<Record> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.log_request(format!("POST /{}", collection_key(path))).await;
        if let Some(error) = self.take_failure().await {
            return Err(error);
        }

        let record = Record::new(Some(self.assign_id()), data);
        let mut collections = self.collections.write().await;
        collections
            .entry(collection_key(path))
            .or_default()
            .push(record.clone());
        tracing::debug!(
            "Created {} in {}",
            record.id.as_ref().map(ToString::to_string).unwrap_or_default(),
            path
        );
        Ok(record)
    }
}
