//! String-keyed storage of opaque blobs.
//!
//! The store offers no transactions and no compare-and-swap: callers that do
//! load-modify-save cycles get last-write-wins semantics.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::database::connection::DatabaseManager;
use crate::database::models::KvEntry;
use crate::error::StoreError;

/// Minimal key-value contract the dialog stores are written against.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Inserts or overwrites `key`, stamping the write time.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Returns whether a record was removed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Drops records under `prefix` whose last write is older than `cutoff`.
    async fn evict_older_than(&self, prefix: &str, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;

    async fn count(&self, prefix: &str) -> Result<u64, StoreError>;

    /// Cheap liveness probe used by the health endpoints.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// [`KvStore`] over the `kv_store` SQLite table.
#[derive(Clone)]
pub struct SqliteKvStore {
    db: DatabaseManager,
}

impl SqliteKvStore {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }
}

#[async_trait]
impl KvStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(KvEntry::find(&self.db.pool, key).await?.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        KvEntry::upsert(&self.db.pool, key, value, Utc::now()).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(KvEntry::delete(&self.db.pool, key).await?)
    }

    async fn evict_older_than(&self, prefix: &str, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        Ok(KvEntry::delete_older_than(&self.db.pool, prefix, cutoff).await?)
    }

    async fn count(&self, prefix: &str) -> Result<u64, StoreError> {
        let count = KvEntry::count_with_prefix(&self.db.pool, prefix).await?;
        Ok(count.max(0) as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_one(&self.db.pool).await?;
        Ok(())
    }
}
