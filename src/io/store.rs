//! JSON snapshot file for restart continuity.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::NamedTempFile;
use tokio::sync::{Mutex, MutexGuard};

use crate::sim::types::{ChargingLabels, PERSIST_DECIMALS, Snapshot, SnapshotRecord};

use super::error::PersistResult;

/// Durable single-record store for the latest engine snapshot.
///
/// Every [`save`](StateStore::save) replaces the whole file by writing a
/// uniquely named sibling temp file and renaming it over the target, so a
/// concurrent reader sees either the old or the new record, never a partial
/// one. Clones share one write-order lock (see [`StateStore::order`]).
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
    labels: ChargingLabels,
    order: Arc<Mutex<()>>,
}

impl StateStore {
    /// Creates a store backed by `path`.
    pub fn new(path: impl Into<PathBuf>, labels: ChargingLabels) -> Self {
        Self {
            path: path.into(),
            labels,
            order: Arc::new(Mutex::new(())),
        }
    }

    /// Path of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Acquires the write-order lock shared by all clones of this store.
    ///
    /// Hold the guard from taking a snapshot until its save completes; saves
    /// then land in the order their snapshots were taken.
    pub async fn order(&self) -> MutexGuard<'_, ()> {
        self.order.lock().await
    }

    /// Returns the stored energy from the state file.
    ///
    /// `None` if the file is missing or cannot be parsed.
    pub fn load(&self) -> Option<f64> {
        self.load_record().map(|r| r.battery_capacity_kwh)
    }

    /// Reads the full record, or `None` if missing or malformed.
    pub fn load_record(&self) -> Option<SnapshotRecord> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "no state file");
                return None;
            }
        };
        match serde_json::from_str::<SnapshotRecord>(&content) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "ignoring unreadable state file"
                );
                None
            }
        }
    }

    /// Writes `snapshot` (rounded to three decimals), replacing any previous record.
    ///
    /// Blocking; async callers go through [`save_blocking`](StateStore::save_blocking).
    ///
    /// # Errors
    ///
    /// Returns a `PersistError` if serialization, writing, or the final
    /// rename fails. The previous record is left intact in that case.
    pub fn save(&self, snapshot: &Snapshot) -> PersistResult<()> {
        let record = snapshot.to_record(&self.labels, PERSIST_DECIMALS);
        let body = serde_json::to_string_pretty(&record)?;

        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent)?;
                parent
            }
            None => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(body.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Runs [`save`](StateStore::save) on the blocking thread pool.
    pub async fn save_blocking(&self, snapshot: Snapshot) -> PersistResult<()> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.save(&snapshot)).await?
    }
}
