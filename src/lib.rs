//! Battery energy-storage controller simulator driven by a synthetic price signal.

/// REST status API (feature `api`).
#[cfg(feature = "api")]
pub mod api;
pub mod cli;
pub mod config;
/// Snapshot file and event log.
pub mod io;
pub mod runtime;
/// Price process, controller, reset trigger, and engine.
pub mod sim;
pub mod telemetry;
