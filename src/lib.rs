//! # Trellis - schema-driven screens
//!
//! Screens are described as data: a DSL compiles them into a JSON tree of
//! schema nodes, and a generic renderer interprets that tree at runtime,
//! evaluating visibility/enable rules against live data.
//!
//! ## Features
//!
//! - **Schema compiler**: nested DSL calls with relationship prefixing, drawers and
//!   declarative JSON/YAML view definitions
//! - **Rule resolver**: HIDE/SHOW/DISABLE/ENABLE rules over 13 operators
//! - **Dynamic renderer**: type and kind registries, template iteration, HTML output
//! - **Relationship picker**: select-existing / create-new / confirm flow over a
//!   list/create record contract
//! - **HTTP API**: compiled views, server-side rendering, in-memory record collections
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use trellis::config::Settings;
//!
//! fn main() -> anyhow::Result<()> {
//!     let settings = Settings::new()?;
//!     let catalog = settings.view_catalog()?;
//!     println!("{} view(s)", catalog.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: schema nodes, rules, translations and the record port
//! - **Compiler / Resolver / Renderer / Picker**: the core, free of I/O except
//!   through [`domain::RecordPort`]
//! - **Adapters**: HTTP handlers and record port implementations
//! - **Config**: settings and view definition loading

pub mod adapters;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod domain;
pub mod picker;
pub mod renderer;
pub mod resolver;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::adapters::api_handler;
use crate::adapters::health_handler::HealthHandler;
use crate::adapters::http_record_client::HttpRecordClient;
use crate::adapters::memory_records::InMemoryRecordStore;
use crate::compiler::ViewCatalog;
use crate::config::Settings;
use crate::domain::RecordPort;
use crate::renderer::Renderer;

/// Shared state of the HTTP surface
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<ViewCatalog>,
    pub renderer: Arc<Renderer>,
    pub records: Arc<dyn RecordPort>,
    pub per_page: u32,
}

impl AppState {
    /// Compile every configured view and pick the record backend
    ///
    /// Records are proxied to `picker.api_base_url` when set and kept in
    /// memory otherwise.
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let catalog = settings.view_catalog()?;
        let records: Arc<dyn RecordPort> = match &settings.picker.api_base_url {
            Some(url) => Arc::new(HttpRecordClient::new(url.clone())),
            None => Arc::new(InMemoryRecordStore::new()),
        };
        let per_page = settings.picker.per_page;

        Ok(Self {
            catalog: Arc::new(catalog),
            renderer: Arc::new(Renderer::with_defaults()),
            records,
            per_page,
        })
    }

    pub fn with_records(mut self, records: Arc<dyn RecordPort>) -> Self {
        self.records = records;
        self
    }
}

/// Creates the Axum application router with all endpoints configured.
pub fn create_app(state: AppState) -> Router {
    let health_handler = Arc::new(HealthHandler::new(state.catalog.clone()));

    let health_router = Router::new()
        .route("/health", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.health().await }
            }
        }))
        .route("/health/ready", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.ready().await }
            }
        }))
        .route("/health/live", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.live().await }
            }
        }));

    let api_router = Router::new()
        .route("/api/views", get(api_handler::list_views))
        .route("/api/views/:name", get(api_handler::get_view))
        .route("/api/views/:name/render", post(api_handler::render_view))
        .route(
            "/api/records/:collection",
            get(api_handler::list_records).post(api_handler::create_record),
        )
        .with_state(state);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    health_router.merge(api_router).layer(cors)
}
