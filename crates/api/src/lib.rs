//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for VAT processing
//! - API-key middleware
//! - Response envelopes and error mapping

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use vatrec_core::vat::VatProcessor;
use vatrec_shared::{ApiKeyPolicy, AppConfig};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Access policy, decided once at startup.
    pub api_key: Arc<ApiKeyPolicy>,
    /// Configured VAT processor.
    pub processor: Arc<VatProcessor>,
    /// Upper bound on rows per request.
    pub max_rows: usize,
    /// Upper bound on request body size, in bytes.
    pub max_body_bytes: usize,
}

impl AppState {
    /// Builds state from loaded configuration.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            api_key: Arc::new(config.auth.policy()),
            processor: Arc::new(VatProcessor::new(&config.vat)),
            max_rows: config.vat.max_rows,
            max_body_bytes: config.server.max_body_bytes,
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(DefaultBodyLimit::max(state.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
