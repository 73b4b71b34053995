//! API-key middleware for protected routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{trace, warn};
use vatrec_shared::Access;

use crate::AppState;
use crate::error::ApiError;

/// Header carrying the shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Checks `X-API-Key` against the configured policy.
///
/// With no key configured every request passes. Otherwise a missing,
/// non-text, or wrong key gets the same 401 response.
pub async fn api_key_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok());

    match state.api_key.verify(provided) {
        Ok(Access::Bypass) => {
            trace!("API key check disabled");
            next.run(request).await
        }
        Ok(Access::Granted) => next.run(request).await,
        Err(e) => {
            warn!(path = %request.uri().path(), "Rejected request: {e}");
            ApiError::from(e).into_response()
        }
    }
}
