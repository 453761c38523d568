use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::compiler::ViewCatalog;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthChecks {
    pub config: String,
    pub views: usize,
}

pub struct HealthHandler {
    catalog: Arc<ViewCatalog>,
    start_time: std::time::Instant,
}

impl HealthHandler {
    pub fn new(catalog: Arc<ViewCatalog>) -> Self {
        Self {
            catalog,
            start_time: std::time::Instant::now(),
        }
    }

    /// Basic health check - returns 200 if server is running
    pub async fn health(&self) -> impl IntoResponse {
        let status = HealthStatus {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            checks: HealthChecks {
                config: "ok".to_string(),
                views: self.catalog.len(),
            },
        };

        (StatusCode::OK, Json(status))
    }

    /// Readiness check - ready once at least one view is compiled
    pub async fn ready(&self) -> impl IntoResponse {
        if !self.catalog.is_empty() {
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "status": "ready",
                    "message": format!("{} view(s) compiled", self.catalog.len())
                })),
            )
        } else {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "not_ready",
                    "message": "No views loaded"
                })),
            )
        }
    }

    /// Liveness check - returns 200 if server is alive
    pub async fn live(&self) -> impl IntoResponse {
        (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "alive",
                "message": "Server is alive"
            })),
        )
    }
}
