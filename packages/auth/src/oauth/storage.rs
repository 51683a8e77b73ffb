// ABOUTME: Key-value storage for in-flight sign-in attempts and persisted sessions
// ABOUTME: In-memory store for tab-scoped data and a SQLite-backed store for durable data

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Row, SqlitePool,
};
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::error::{AuthError, AuthResult};

/// Documented storage keys
pub mod keys {
    /// PKCE code verifier of the in-flight attempt (ephemeral)
    pub const CODE_VERIFIER: &str = "oauth_code_verifier";
    /// CSRF state of the in-flight attempt (ephemeral)
    pub const STATE: &str = "oauth_state";
    /// Bearer token (durable)
    pub const ACCESS_TOKEN: &str = "scout_access_token";
    /// JSON user record (durable)
    pub const USER: &str = "scout_user";
}

/// String key-value store with a documented lifetime
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> AuthResult<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> AuthResult<()>;
    async fn remove(&self, key: &str) -> AuthResult<()>;
}

/// In-process store; its lifetime is the owning process (tab-scoped)
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> AuthResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> AuthResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> AuthResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// Durable store backed by a SQLite database; survives across sessions
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database file at `path` and ensure the schema exists
    pub async fn open(path: &Path) -> AuthResult<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| AuthError::Storage(format!("Failed to open session database: {}", e)))?;

        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, creating the `kv_entries` table if needed
    pub async fn from_pool(pool: SqlitePool) -> AuthResult<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_entries (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL DEFAULT (unixepoch())
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> AuthResult<Option<String>> {
        let row = sqlx::query("SELECT value FROM kv_entries WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row.try_get("value")?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> AuthResult<()> {
        debug!("Storing entry: {}", key);

        sqlx::query(
            r#"
            INSERT INTO kv_entries (key, value, updated_at)
            VALUES (?, ?, unixepoch())
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = unixepoch()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to store entry {}: {}", key, e);
            AuthError::Storage(format!("Failed to store {}: {}", key, e))
        })?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> AuthResult<()> {
        debug!("Removing entry: {}", key);

        sqlx::query("DELETE FROM kv_entries WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get(keys::STATE).await.unwrap(), None);

        store.set(keys::STATE, "abc").await.unwrap();
        assert_eq!(store.get(keys::STATE).await.unwrap().as_deref(), Some("abc"));

        store.set(keys::STATE, "def").await.unwrap();
        assert_eq!(store.get(keys::STATE).await.unwrap().as_deref(), Some("def"));

        store.remove(keys::STATE).await.unwrap();
        assert_eq!(store.get(keys::STATE).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_remove_missing_is_ok() {
        let store = MemoryStore::new();
        assert!(store.remove("never-set").await.is_ok());
    }
}
