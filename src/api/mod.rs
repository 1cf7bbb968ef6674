//! REST API exposing the live engine status.
//!
//! Provides two GET endpoints:
//! - `/get_status`: rounded snapshot of the current engine state
//! - `/health`: liveness probe

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;

use crate::sim::engine::SharedEngine;
use crate::sim::types::ChargingLabels;

pub use types::{HealthResponse, StatusResponse};

/// Application state shared across all request handlers.
///
/// Handlers only read the engine; they hold its lock just long enough to
/// copy a snapshot.
pub struct AppState {
    /// Live engine.
    pub engine: SharedEngine,
    /// Charging flag rendering.
    pub labels: ChargingLabels,
    /// Decimal places in responses.
    pub decimals: u32,
}

/// Builds the axum router with all API routes.
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured `Router` ready to serve.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/get_status", get(handlers::get_status))
        .route("/health", get(handlers::health))
        .with_state(state)
}

/// Binds to the given address and serves the API until the process exits.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "status API listening");
    axum::serve(listener, app).await
}
