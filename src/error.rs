//! Error taxonomy shared by the dialog core, the stores and the bot layer.
//!
//! None of these errors is fatal to the process: every inbound update is handled
//! independently and a failure only aborts the handling of that one update.

use thiserror::Error;

/// The date-parsing service could not be reached or replied with garbage.
///
/// This is distinct from a successful call that could not parse the text,
/// which is reported as `Ok(None)` by [`crate::services::date_parser::DateResolver`].
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("date parser request failed: {0}")]
    Transport(String),
    #[error("date parser returned status {0}")]
    Status(u16),
    #[error("malformed date parser reply: {0}")]
    Malformed(String),
}

/// The key-value store backing sessions and correlation entries failed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key-value store unavailable: {0}")]
    Backend(String),
    #[error("cannot encode or decode stored record: {0}")]
    Codec(#[from] serde_json::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Failures of the calendar backend.
#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("{0} not found in calendar")]
    NotFound(String),
    #[error("user is not authorized with the calendar service")]
    Unauthorized,
    #[error("calendar service returned status {0}")]
    Status(u16),
    #[error("calendar request failed: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for CalendarError {
    fn from(err: reqwest::Error) -> Self {
        CalendarError::Transport(err.to_string())
    }
}

/// Umbrella error for handling one inbound update.
#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0} not found")]
    NotFound(String),
    #[error("draft is incomplete, missing: {}", .0.join(", "))]
    Validation(Vec<&'static str>),
    #[error("user {presser} may not act on a prompt owned by {owner:?}")]
    Permission { presser: u64, owner: Option<u64> },
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error(transparent)]
    Telegram(#[from] teloxide::RequestError),
}

/// Result alias used across the crate.
pub type BotResult<T> = Result<T, BotError>;
