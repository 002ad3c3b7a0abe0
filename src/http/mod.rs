pub mod dtos;
pub mod handlers;
pub mod health;

use axum::{
    Router,
    routing::{get, post},
};

use crate::app_state::AppState;

/// Admin API surface. Authentication, CSV rendering and forms live in the
/// admin UI in front of these endpoints.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::health_check))
        .route(
            "/v1/broken-links",
            get(handlers::list_broken_links).delete(handlers::remove_broken_link),
        )
        .route("/v1/broken-links/count", get(handlers::count_broken_links))
        .route("/v1/audit/run", post(handlers::run_audit))
        .with_state(state)
}
