//! Client for the external free-text date parsing service.

use async_trait::async_trait;
use chrono::{DateTime, Datelike};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::dialog::draft::Instant;
use crate::error::ResolutionError;

/// Turns user text such as "tomorrow 10:00" into an instant.
///
/// `Ok(None)` means the service answered but could not understand the text;
/// the user should simply be asked again. `Err` means the service itself failed.
#[async_trait]
pub trait DateResolver: Send + Sync {
    async fn resolve(&self, text: &str, timezone: &str) -> Result<Option<Instant>, ResolutionError>;
}

#[derive(Debug, Serialize)]
struct ParseDateRequest<'a> {
    timezone: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ParseDateResponse {
    #[serde(default)]
    date: Option<String>,
}

/// [`DateResolver`] speaking `PUT {base}/parse/date`.
#[derive(Clone)]
pub struct HttpDateResolver {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpDateResolver {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ResolutionError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ResolutionError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/parse/date", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl DateResolver for HttpDateResolver {
    async fn resolve(&self, text: &str, timezone: &str) -> Result<Option<Instant>, ResolutionError> {
        let response = self
            .client
            .put(&self.endpoint)
            .json(&ParseDateRequest { timezone, text })
            .send()
            .await
            .map_err(|e| ResolutionError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolutionError::Status(status.as_u16()));
        }

        let body: ParseDateResponse = response
            .json()
            .await
            .map_err(|e| ResolutionError::Malformed(e.to_string()))?;

        tracing::debug!("Date parser answered {:?} for '{}'", body.date, text);
        interpret_date(body.date.as_deref())
    }
}

/// The service encodes "could not parse" as a missing, empty or zero date.
pub fn interpret_date(raw: Option<&str>) -> Result<Option<Instant>, ResolutionError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(raw) => raw,
    };

    let parsed = DateTime::parse_from_rfc3339(raw)
        .map_err(|e| ResolutionError::Malformed(format!("'{raw}': {e}")))?;

    if parsed.year() <= 1 {
        Ok(None)
    } else {
        Ok(Some(parsed))
    }
}
