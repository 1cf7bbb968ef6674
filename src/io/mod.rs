//! Durable persistence: snapshot file and append-only event log.

pub mod error;
pub mod event_log;
pub mod store;

pub use error::{PersistError, PersistResult};
pub use event_log::EventLogger;
pub use store::StateStore;
