//! API response types.
//!
//! The status body uses the same field names as the persisted snapshot.

use serde::Serialize;

/// Body of `GET /get_status`.
pub use crate::sim::types::SnapshotRecord as StatusResponse;

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: &'static str,
}
