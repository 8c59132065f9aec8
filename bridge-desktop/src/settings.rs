//! Settings Storage using SQLite

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::SettingsStore,
};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    Row,
};
use std::path::PathBuf;
use tracing::debug;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS settings (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at INTEGER NOT NULL
    )
"#;

/// SQLite-backed settings store implementation
///
/// Persists the small key-value entries the core needs across restarts,
/// such as the font preload completion marker.
pub struct SqliteSettingsStore {
    pool: SqlitePool,
}

impl SqliteSettingsStore {
    /// Open (or create) a settings database at `db_path`
    pub async fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            core_async::fs::create_dir_all(parent)
                .await
                .map_err(BridgeError::Io)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to connect to DB: {}", e)))?;

        Self::create_table(&pool).await?;
        debug!(path = ?db_path, "Initialized settings store");

        Ok(Self { pool })
    }

    /// Create an in-memory settings store (for testing)
    pub async fn in_memory() -> Result<Self> {
        // Every connection to `sqlite::memory:` is a separate database, so the
        // pool must never open a second one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to connect to DB: {}", e)))?;

        Self::create_table(&pool).await?;
        Ok(Self { pool })
    }

    async fn create_table(pool: &SqlitePool) -> Result<()> {
        sqlx::query(CREATE_TABLE)
            .execute(pool)
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to create table: {}", e)))?;
        Ok(())
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Self::now())
        .execute(&self.pool)
        .await
        .map_err(|e| BridgeError::OperationFailed(format!("Failed to set setting: {}", e)))?;

        debug!(key = key, "Stored setting");
        Ok(())
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to get setting: {}", e)))?;

        Ok(row.map(|row| row.get(0)))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM settings WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                BridgeError::OperationFailed(format!("Failed to delete setting: {}", e))
            })?;

        debug!(key = key, "Deleted setting");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_string_operations() {
        let store = SqliteSettingsStore::in_memory().await.unwrap();

        store.set_string("quran_fonts_preload", "true").await.unwrap();
        let value = store.get_string("quran_fonts_preload").await.unwrap();
        assert_eq!(value, Some("true".to_string()));

        store.set_string("quran_fonts_preload", "false").await.unwrap();
        let value = store.get_string("quran_fonts_preload").await.unwrap();
        assert_eq!(value, Some("false".to_string()));

        store.delete("quran_fonts_preload").await.unwrap();
        assert_eq!(store.get_string("quran_fonts_preload").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_ok() {
        let store = SqliteSettingsStore::in_memory().await.unwrap();
        store.delete("never_written").await.unwrap();
        assert_eq!(store.get_string("never_written").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let store = SqliteSettingsStore::in_memory().await.unwrap();

        store.set_string("quran_fonts_preload", "true").await.unwrap();
        store.set_string("quran_fonts_preload_version", "1.0").await.unwrap();
        store.delete("quran_fonts_preload").await.unwrap();

        assert_eq!(store.get_string("quran_fonts_preload").await.unwrap(), None);
        assert_eq!(
            store.get_string("quran_fonts_preload_version").await.unwrap(),
            Some("1.0".to_string())
        );
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let path = std::env::temp_dir()
            .join(format!("mushaf-settings-{}", uuid::Uuid::new_v4()))
            .join("settings.db");

        {
            let store = SqliteSettingsStore::new(path.clone()).await.unwrap();
            store.set_string("quran_fonts_preload_version", "2.0").await.unwrap();
            store.pool.close().await;
        }

        let reopened = SqliteSettingsStore::new(path.clone()).await.unwrap();
        assert_eq!(
            reopened
                .get_string("quran_fonts_preload_version")
                .await
                .unwrap(),
            Some("2.0".to_string())
        );

        reopened.pool.close().await;
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
