use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::{ListQuery, ListResponse};

/// Cache key: one list request against one endpoint
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub endpoint: String,
    pub query: ListQuery,
}

impl QueryKey {
    pub fn new(endpoint: &str, query: &ListQuery) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            query: query.clone(),
        }
    }
}

/// List responses shared by every picker of the process
#[derive(Clone, Default)]
pub struct QueryCache {
    entries: Arc<RwLock<HashMap<QueryKey, ListResponse>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, endpoint: &str, query: &ListQuery) -> Option<ListResponse> {
        let entries = self.entries.read().await;
        entries.get(&QueryKey::new(endpoint, query)).cloned()
    }

    pub async fn insert(&self, endpoint: &str, query: &ListQuery, response: ListResponse) {
        let mut entries = self.entries.write().await;
        entries.insert(QueryKey::new(endpoint, query), response);
    }

    /// Drop every cached page of `endpoint`, whatever its page or search term
    pub async fn invalidate(&self, endpoint: &str) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| key.endpoint != endpoint);
        let removed = before - entries.len();
        tracing::debug!("Invalidated {} cached list(s) of {}", removed, endpoint);
        removed
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalidate_drops_every_key_of_the_endpoint() {
        let cache = QueryCache::new();
        let empty = ListResponse {
            data: vec![],
            pagination: None,
        };
        cache.insert("/contacts", &ListQuery::new(1, 10), empty.clone()).await;
        cache
            .insert("/contacts", &ListQuery::new(1, 10).with_search(Some("ann")), empty.clone())
            .await;
        cache.insert("/companies", &ListQuery::new(1, 10), empty).await;

        assert_eq!(cache.invalidate("/contacts").await, 2);
        assert_eq!(cache.len().await, 1);
        assert!(cache.get("/companies", &ListQuery::new(1, 10)).await.is_some());
        assert!(cache.get("/contacts", &ListQuery::new(1, 10)).await.is_none());
    }
}
