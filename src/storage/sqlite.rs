use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{info, warn};

use super::KeyValueStore;
use crate::config::DatabaseConfig;
use crate::error::{StorageError, StorageResult};

/// Static migrator that embeds migrations at compile time
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// SQLite-backed key-value store
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database file and run migrations
    pub async fn new(config: &DatabaseConfig) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Connection {
                message: format!("Failed to create database directory: {}", e),
            })?;
        }

        let database_url = format!("sqlite://{}?mode=rwc", config.path.display());

        let options = SqliteConnectOptions::from_str(&database_url)
            .map_err(|e| StorageError::Connection {
                message: format!("Invalid database URL: {}", e),
            })?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection {
                message: format!("Failed to connect to database: {}", e),
            })?;

        let storage = Self { pool };
        storage.run_migrations().await?;

        Ok(storage)
    }

    /// In-memory database on a single connection, for tests
    pub async fn new_in_memory() -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(|e| {
            StorageError::Connection {
                message: format!("Invalid database URL: {}", e),
            }
        })?;

        // Each connection to :memory: is a separate database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection {
                message: format!("Failed to open in-memory database: {}", e),
            })?;

        let storage = Self { pool };
        storage.run_migrations().await?;

        Ok(storage)
    }

    /// Run database migrations using embedded sqlx migrations
    async fn run_migrations(&self) -> StorageResult<()> {
        info!("Running database migrations...");

        MIGRATOR.run(&self.pool).await.map_err(|e| StorageError::Migration {
            message: format!("Failed to run migrations: {}", e),
        })?;

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Get the underlying pool for advanced queries
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        let row: Option<EntryRow> = sqlx::query_as(
            r#"
            SELECT key, value, updated_at
            FROM kv_entries
            WHERE key = ?
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => match serde_json::from_str(&row.value) {
                Ok(value) => Ok(Some(value)),
                Err(e) => {
                    warn!(
                        key = %row.key,
                        updated_at = %row.updated_at,
                        error = %e,
                        "Stored entry is not valid JSON"
                    );
                    Err(StorageError::Serialization {
                        key: row.key,
                        message: e.to_string(),
                    })
                }
            },
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &Value) -> StorageResult<()> {
        let encoded = serde_json::to_string(value).map_err(|e| StorageError::Serialization {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        sqlx::query(
            r#"
            INSERT INTO kv_entries (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(&encoded)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Query {
            message: format!("Failed to write '{}': {}", key, e),
        })?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        sqlx::query("DELETE FROM kv_entries WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Query {
                message: format!("Failed to remove '{}': {}", key, e),
            })?;

        Ok(())
    }
}

// Internal row type for SQLx mapping
#[derive(sqlx::FromRow)]
struct EntryRow {
    key: String,
    value: String,
    updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_in_memory_set_and_get() {
        let store = SqliteStore::new_in_memory().await.unwrap();
        store.set("k", &json!([1, 2])).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!([1, 2])));
    }

    #[tokio::test]
    async fn test_upsert_replaces_value() {
        let store = SqliteStore::new_in_memory().await.unwrap();
        store.set("k", &json!("first")).await.unwrap();
        store.set("k", &json!("second")).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!("second")));

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM kv_entries")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }

    #[tokio::test]
    async fn test_write_on_closed_pool_is_query_error() {
        let store = SqliteStore::new_in_memory().await.unwrap();
        store.pool().close().await;

        let err = store.set("k", &json!(1)).await.unwrap_err();
        assert!(matches!(err, StorageError::Query { ref message } if message.contains("'k'")));
        assert!(matches!(
            store.remove("k").await,
            Err(StorageError::Query { .. })
        ));
    }

    #[tokio::test]
    async fn test_remove_missing_key_is_ok() {
        let store = SqliteStore::new_in_memory().await.unwrap();
        assert!(store.remove("absent").await.is_ok());
        assert_eq!(store.get("absent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_entry_reports_serialization_error() {
        let store = SqliteStore::new_in_memory().await.unwrap();
        sqlx::query("INSERT INTO kv_entries (key, value, updated_at) VALUES ('bad', '{oops', '')")
            .execute(store.pool())
            .await
            .unwrap();
        assert!(matches!(
            store.get("bad").await,
            Err(StorageError::Serialization { .. })
        ));
    }
}
