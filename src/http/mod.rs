//! HTTP transport: routes, request decoding and error responses.

mod error;
mod routes;
mod server;
mod types;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub use error::ApiError;
pub use server::run_server;
pub use types::{SortRequest, SortResponse};

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.max_body_bytes;

    Router::new()
        .route("/process-single", post(routes::process_single))
        .route("/process-concurrent", post(routes::process_concurrent))
        .route("/health", get(routes::health))
        .route("/live", get(routes::live))
        .route("/ready", get(routes::ready))
        .route("/metrics", get(routes::metrics))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
