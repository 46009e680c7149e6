//! Key-value persistence for case history, notes, and bookmarks.
//!
//! Values are JSON documents addressed by string keys. Every mutation done
//! by the stores built on top of this layer is a read-modify-write with no
//! locking; the last writer wins.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{StorageError, StorageResult};

/// Key holding the bounded history array.
pub const HISTORY_KEY: &str = "case_history";
/// Key holding the bookmark array.
pub const BOOKMARKS_KEY: &str = "case_bookmarks";
/// Prefix of per-case note keys.
pub const NOTES_KEY_PREFIX: &str = "case_notes:";

/// Note key for a case name.
pub fn notes_key(case_name: &str) -> String {
    format!("{}{}", NOTES_KEY_PREFIX, case_name)
}

/// Backend-agnostic JSON key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> StorageResult<Option<Value>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &Value) -> StorageResult<()>;

    /// Delete `key`. Deleting a missing key is not an error.
    async fn remove(&self, key: &str) -> StorageResult<()>;
}

/// Read and deserialize a typed value.
pub async fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> StorageResult<Option<T>> {
    match store.get(key).await? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| StorageError::Serialization {
                key: key.to_string(),
                message: e.to_string(),
            }),
        None => Ok(None),
    }
}

/// Serialize and store a typed value.
pub async fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> StorageResult<()> {
    let value = serde_json::to_value(value).map_err(|e| StorageError::Serialization {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    store.set(key, &value).await
}
