//! Record port over HTTP, speaking the list/create contract

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::domain::{ListQuery, ListResponse, Record, RecordError, RecordPort, RecordResult};

/// Talks to `{base_url}{path}` for every resource path
pub struct HttpRecordClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRecordClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path_and_query: &str) -> String {
        format!("{}/{}", self.base_url, path_and_query.trim_start_matches('/'))
    }

    async fn check(response: reqwest::Response, path: &str) -> RecordResult<reqwest::Response> {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RecordError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RecordError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl RecordPort for HttpRecordClient {
    async fn list(&self, path: &str, query: &ListQuery) -> RecordResult<ListResponse> {
        let url = self.url(&query.to_url(path));
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let response = Self::check(response, path).await?;
        response
            .json::<ListResponse>()
            .await
            .map_err(|e| RecordError::Parse(format!("Failed to parse list of {}: {}", path, e)))
    }

    async fn create(&self, path: &str, data: Map<String, Value>) -> RecordResult<Record> {
        let url = self.url(path);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(&json!({ "data": data }))
            .send()
            .await?;
        let response = Self::check(response, path).await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| RecordError::Parse(format!("Failed to parse created {}: {}", path, e)))?;

        Record::from_value(body)
            .filter(Record::is_persisted)
            .ok_or_else(|| RecordError::Parse(format!("Created {} record has no id", path)))
    }
}
