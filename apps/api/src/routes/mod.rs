pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::extraction::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/rfps/extract", post(handlers::handle_extract_rfp))
        .route(
            "/api/v1/proposals/extract",
            post(handlers::handle_extract_proposal),
        )
        .route("/api/v1/proposals/compare", post(handlers::handle_compare))
        .with_state(state)
}
