//! Bounded, newest-first history of completed analyses.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::case::{CaseSnapshot, SnapshotId};
use crate::error::StorageResult;
use crate::storage::{save_json, KeyValueStore, HISTORY_KEY};

/// Maximum number of snapshots kept.
pub const HISTORY_LIMIT: usize = 10;

/// History of completed analyses, persisted under [`HISTORY_KEY`].
#[derive(Clone)]
pub struct HistoryCache {
    store: Arc<dyn KeyValueStore>,
}

impl HistoryCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Current history, newest first.
    ///
    /// Stored entries that no longer parse are skipped rather than failing
    /// the whole list.
    pub async fn list(&self) -> StorageResult<Vec<CaseSnapshot>> {
        let entries = match self.store.get(HISTORY_KEY).await? {
            Some(Value::Array(entries)) => entries,
            Some(other) => {
                warn!(kind = ?other, "History entry is not a list, treating as empty");
                return Ok(Vec::new());
            }
            None => return Ok(Vec::new()),
        };

        let total = entries.len();
        let snapshots: Vec<CaseSnapshot> = entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value(entry) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable history entry");
                    None
                }
            })
            .collect();

        if snapshots.len() < total {
            debug!(total, kept = snapshots.len(), "History contained unreadable entries");
        }

        Ok(snapshots)
    }

    /// Put `snapshot` at the front and drop anything past [`HISTORY_LIMIT`].
    /// Returns the stored list.
    pub async fn append(&self, snapshot: CaseSnapshot) -> StorageResult<Vec<CaseSnapshot>> {
        let mut history = self.list().await?;
        let id = snapshot.id;

        history.insert(0, snapshot);
        history.truncate(HISTORY_LIMIT);

        save_json(self.store.as_ref(), HISTORY_KEY, &history).await?;
        info!(snapshot_id = %id, size = history.len(), "Snapshot added to history");

        Ok(history)
    }

    /// Remove a snapshot. Returns whether anything was removed.
    pub async fn remove(&self, id: SnapshotId) -> StorageResult<bool> {
        let mut history = self.list().await?;
        let before = history.len();
        history.retain(|snapshot| snapshot.id != id);

        if history.len() == before {
            return Ok(false);
        }

        save_json(self.store.as_ref(), HISTORY_KEY, &history).await?;
        info!(snapshot_id = %id, "Snapshot removed from history");
        Ok(true)
    }

    /// Find a snapshot to restore into the workspace.
    pub async fn load(&self, id: SnapshotId) -> StorageResult<Option<CaseSnapshot>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|snapshot| snapshot.id == id))
    }
}
