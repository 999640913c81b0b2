//! Health check endpoint

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::storage::PhotoStore;
use crate::AppState;

/// GET /health
///
/// Reports process status and the configured storage bucket.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "cellar-api",
        "version": env!("CARGO_PKG_VERSION"),
        "bucket": state.store.bucket(),
    }))
}
