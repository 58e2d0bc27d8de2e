//! Maps the short token carried by an inline "expand" button (the event uid)
//! back to the calendar that owns the event.
//!
//! Entries may vanish at any time (eviction, store reset); a miss is an
//! ordinary outcome for callers, not an error.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::database::KvStore;
use crate::error::StoreError;

pub const CORRELATION_PREFIX: &str = "corr:";

#[derive(Clone)]
pub struct CorrelationStore {
    kv: Arc<dyn KvStore>,
}

impl CorrelationStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    fn key(event_uid: &str) -> String {
        format!("{CORRELATION_PREFIX}{event_uid}")
    }

    /// Idempotent: the same event always maps to the same calendar.
    pub async fn remember(&self, event_uid: &str, calendar_uid: &str) -> Result<(), StoreError> {
        self.kv.set(&Self::key(event_uid), calendar_uid).await
    }

    pub async fn lookup(&self, event_uid: &str) -> Result<Option<String>, StoreError> {
        self.kv.get(&Self::key(event_uid)).await
    }

    pub async fn evict_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        self.kv.evict_older_than(CORRELATION_PREFIX, cutoff).await
    }

    pub async fn count(&self) -> Result<u64, StoreError> {
        self.kv.count(CORRELATION_PREFIX).await
    }
}
