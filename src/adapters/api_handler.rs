//! REST API handlers for compiled views and the built-in record collections
//!
//! View endpoints wrap their payload in [`ApiResponse`]; record endpoints
//! speak the bare list/create contract so pickers can point at them directly.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::{ListQuery, RecordError, RecordPort};
use crate::renderer::FormState;
use crate::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Serialize)]
pub struct ViewSummary {
    pub name: String,
    pub nodes: usize,
}

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub form: Option<Value>,
}

#[derive(Serialize)]
pub struct RenderResponse {
    pub html: String,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRecordRequest {
    #[serde(default)]
    pub data: Map<String, Value>,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("View not found: {0}")]
    ViewNotFound(String),

    #[error(transparent)]
    Record(#[from] RecordError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::ViewNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Record(RecordError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Record(RecordError::Parse(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Record(RecordError::Api { status, .. }) => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ApiError::Record(RecordError::Network(_)) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        (status, Json(ApiResponse::<()>::error(self.to_string()))).into_response()
    }
}

// ============================================================================
// View Handlers
// ============================================================================

/// GET /api/views - List compiled views
pub async fn list_views(State(state): State<AppState>) -> impl IntoResponse {
    let views: Vec<ViewSummary> = state
        .catalog
        .names()
        .into_iter()
        .filter_map(|name| {
            let schema = state.catalog.get(&name)?;
            Some(ViewSummary {
                nodes: schema.nodes().len(),
                name,
            })
        })
        .collect();
    (StatusCode::OK, Json(ApiResponse::success(views)))
}

/// GET /api/views/:name - Compiled schema of one view
pub async fn get_view(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    let schema = state
        .catalog
        .get(&name)
        .ok_or_else(|| ApiError::ViewNotFound(name.clone()))?;
    Ok((StatusCode::OK, Json(ApiResponse::success(schema.as_ref().clone()))).into_response())
}

/// POST /api/views/:name/render - Render a view against data and form state
pub async fn render_view(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<RenderRequest>,
) -> Result<Response, ApiError> {
    let schema = state
        .catalog
        .get(&name)
        .ok_or_else(|| ApiError::ViewNotFound(name.clone()))?;

    let form = request.form.map(FormState::with_values);
    let html = state
        .renderer
        .render_view(&schema, &request.data, form.as_ref())
        .map(|rendered| rendered.to_html())
        .unwrap_or_default();

    Ok((StatusCode::OK, Json(ApiResponse::success(RenderResponse { html }))).into_response())
}

// ============================================================================
// Record Handlers
// ============================================================================

/// GET /api/records/:collection?page&per_page&q
pub async fn list_records(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Response, ApiError> {
    let per_page = params.per_page.unwrap_or(state.per_page);
    let query = ListQuery::new(params.page.unwrap_or(1), per_page).with_search(params.q.as_deref());
    let path = format!("/{}", collection);

    let response = state.records.list(&path, &query).await?;
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// POST /api/records/:collection with `{data}`
pub async fn create_record(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Json(request): Json<CreateRecordRequest>,
) -> Result<Response, ApiError> {
    let path = format!("/{}", collection);
    let record = state.records.create(&path, request.data).await?;
    Ok((StatusCode::CREATED, Json(record)).into_response())
}
