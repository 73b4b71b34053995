//! Liveness route. Always public, even when an API key is configured.

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::AppState;

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct Liveness {
    /// Always `"healthy"` while the process can answer.
    pub status: &'static str,
    /// Name of the reconciliation service.
    pub service: &'static str,
    /// Crate version of the running build.
    pub version: &'static str,
}

async fn liveness() -> Json<Liveness> {
    Json(Liveness {
        status: "healthy",
        service: "vatrec",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Creates the liveness route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(liveness))
}
