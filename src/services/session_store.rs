//! Typed access to per-user [`Session`] records.
//!
//! There is deliberately no per-user lock: two updates from the same user that
//! race through load-modify-save both succeed and the later save wins. A lost
//! draft edit is cheap to redo, a stalled dialog is not.

use std::sync::Arc;

use crate::database::KvStore;
use crate::dialog::Session;
use crate::error::StoreError;

pub const SESSION_PREFIX: &str = "session:";

#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KvStore>,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    pub fn key(user_id: u64) -> String {
        format!("{SESSION_PREFIX}{user_id}")
    }

    /// Returns the stored session, or a fresh one when the user has none yet.
    pub async fn load(&self, user_id: u64) -> Result<Session, StoreError> {
        match self.kv.get(&Self::key(user_id)).await? {
            Some(blob) => serde_json::from_str(&blob).map_err(|e| {
                tracing::warn!("Undecodable session for user {}: {}", user_id, e);
                StoreError::from(e)
            }),
            None => Ok(Session::default()),
        }
    }

    pub async fn save(&self, user_id: u64, session: &Session) -> Result<(), StoreError> {
        let blob = serde_json::to_string(session)?;
        self.kv.set(&Self::key(user_id), &blob).await
    }

    /// Drops the stored session; the next `load` starts from scratch.
    pub async fn purge(&self, user_id: u64) -> Result<bool, StoreError> {
        self.kv.delete(&Self::key(user_id)).await
    }

    pub async fn count(&self) -> Result<u64, StoreError> {
        self.kv.count(SESSION_PREFIX).await
    }
}
