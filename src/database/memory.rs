use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::database::store::KvStore;
use crate::error::StoreError;

/// Process-local [`KvStore`]. Used by tests and by `DATABASE_URL=memory` runs,
/// where losing every in-flight dialog on restart is acceptable.
#[derive(Clone, Default)]
pub struct InMemoryKvStore {
    entries: Arc<RwLock<HashMap<String, (String, DateTime<Utc>)>>>,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a record with an explicit timestamp.
    pub fn insert_at(&self, key: &str, value: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.insert(key.to_string(), (value.to_string(), at));
        Ok(())
    }

    pub fn keys(&self) -> Vec<String> {
        match self.entries.read() {
            Ok(entries) => {
                let mut keys: Vec<String> = entries.keys().cloned().collect();
                keys.sort();
                keys
            }
            Err(_) => Vec::new(),
        }
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("in-memory store lock poisoned".to_string())
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(key).map(|(value, _)| value.clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.insert_at(key, value, Utc::now())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        Ok(entries.remove(key).is_some())
    }

    async fn evict_older_than(&self, prefix: &str, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        let before = entries.len();
        entries.retain(|key, (_, at)| !(key.starts_with(prefix) && *at < cutoff));
        Ok((before - entries.len()) as u64)
    }

    async fn count(&self, prefix: &str) -> Result<u64, StoreError> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.keys().filter(|key| key.starts_with(prefix)).count() as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
