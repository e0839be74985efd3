use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::llm_client::model_status;
use crate::state::AppState;

/// GET /health
/// Returns service status plus reachability of the generation model.
/// Always 200: a down model is reported in the body, not as a failed check.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let model = model_status(state.llm.as_ref()).await;

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "procurement-api",
        "model": model
    }))
}
