//! HTTP routes and handlers.

mod paste;

use axum::{
    Router,
    routing::{get, post},
};

use super::state::AppState;

/// Build the router.
///
/// The POST endpoint is taken from the state; when it is empty pastes are
/// POSTed to the root path, alongside the landing GET.
pub fn router(state: AppState) -> Router {
    let endpoint = state.endpoint_path();

    Router::new()
        .route("/health", get(health))
        .route("/", get(paste::landing))
        .route("/{key}", get(paste::show))
        .route(&endpoint, post(paste::create))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}
