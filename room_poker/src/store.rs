//! The KV snapshot-store contract (§6): `get`/`put`/`delete`/`list_with_prefix`
//! over opaque room-snapshot blobs, keyed `"room:{id}"`.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

pub const ROOM_KEY_PREFIX: &str = "room:";

#[must_use]
pub fn room_key(room_id: i64) -> String {
    format!("{ROOM_KEY_PREFIX}{room_id}")
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// A narrow, opaque KV contract. The coordinator is the only caller and
/// always stores a serialized `RoomSnapshot`-equivalent blob; the store
/// itself never interprets the bytes.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
    async fn list_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

/// An in-process store for tests and single-process development.
#[derive(Default)]
pub struct InMemoryStore {
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
        }
    }
}

#[async_trait]
impl SnapshotStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let entries = self.entries.lock().expect("store mutex poisoned");
        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().expect("store mutex poisoned");
        entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().expect("store mutex poisoned");
        entries.remove(key);
        Ok(())
    }

    async fn list_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let entries = self.entries.lock().expect("store mutex poisoned");
        Ok(entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

/// Pool configuration for the Postgres-backed store, mirroring how the
/// server configures its other database pools.
#[derive(Clone, Debug)]
pub struct PostgresStoreConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl PostgresStoreConfig {
    #[must_use]
    pub fn from_env() -> Result<Self, StoreError> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| StoreError::Backend("DATABASE_URL must be set".into()))?;
        Ok(Self {
            database_url,
            max_connections: parse_env_or("DB_MAX_CONNECTIONS", 20),
            min_connections: parse_env_or("DB_MIN_CONNECTIONS", 5),
            connection_timeout_secs: parse_env_or("DB_CONNECTION_TIMEOUT", 10),
            idle_timeout_secs: parse_env_or("DB_IDLE_TIMEOUT", 600),
        })
    }
}

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// `room_snapshots(key TEXT PRIMARY KEY, value BYTEA NOT NULL)` backed store.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(config: &PostgresStoreConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for PostgresStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let row: Option<(Vec<u8>,)> = sqlx::query_as("SELECT value FROM room_snapshots WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(row.map(|(value,)| value))
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO room_snapshots (key, value) VALUES ($1, $2)
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM room_snapshots WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn list_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let pattern = format!("{prefix}%");
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT key FROM room_snapshots WHERE key LIKE $1")
                .bind(pattern)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(rows.into_iter().map(|(key,)| key).collect())
    }
}
