//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::api_key_middleware};

pub mod health;
pub mod vat;

/// Creates the API router; VAT routes sit behind the API-key middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(vat::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api_key_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}
