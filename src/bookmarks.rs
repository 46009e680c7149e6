//! Bookmarked cases, a set keyed by case name.

use std::sync::Arc;

use tracing::{info, warn};

use crate::case::BookmarkEntry;
use crate::error::{StorageError, StorageResult};
use crate::storage::{load_json, save_json, KeyValueStore, BOOKMARKS_KEY};

#[derive(Clone)]
pub struct BookmarkRegistry {
    store: Arc<dyn KeyValueStore>,
}

impl BookmarkRegistry {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// All bookmarks in the order they were added.
    pub async fn list(&self) -> StorageResult<Vec<BookmarkEntry>> {
        match load_json::<Vec<BookmarkEntry>>(self.store.as_ref(), BOOKMARKS_KEY).await {
            Ok(entries) => Ok(entries.unwrap_or_default()),
            Err(StorageError::Serialization { message, .. }) => {
                warn!(error = %message, "Stored bookmarks unreadable, treating as empty");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn is_bookmarked(&self, name: &str) -> StorageResult<bool> {
        Ok(self.list().await?.iter().any(|entry| entry.name == name))
    }

    /// Remove the bookmark named like `entry`, or add `entry` if there is
    /// none. Returns whether the name is bookmarked afterwards.
    pub async fn toggle(&self, entry: BookmarkEntry) -> StorageResult<bool> {
        let mut entries = self.list().await?;
        let before = entries.len();
        entries.retain(|existing| existing.name != entry.name);

        let bookmarked = entries.len() == before;
        let name = entry.name.clone();
        if bookmarked {
            entries.push(entry);
        }

        save_json(self.store.as_ref(), BOOKMARKS_KEY, &entries).await?;
        info!(case = %name, bookmarked, total = entries.len(), "Bookmark toggled");
        Ok(bookmarked)
    }
}
