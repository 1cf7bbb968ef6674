//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;

use super::AppState;
use super::types::{HealthResponse, StatusResponse};

/// Returns the current engine status, rounded for display.
///
/// `GET /get_status` → 200 + `StatusResponse` JSON
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let snapshot = state.engine.lock().await.snapshot();
    Json(snapshot.to_record(&state.labels, state.decimals))
}

/// `GET /health` → 200 + `{"status":"ok"}`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
