use anyhow::{anyhow, Result};

/// Telegram refuses inline buttons whose payload exceeds this many bytes.
pub const MAX_CALLBACK_DATA_BYTES: usize = 64;

pub fn validate_callback_data(data: &str) -> Result<()> {
    if data.is_empty() {
        return Err(anyhow!("Callback data cannot be empty"));
    }

    if data.len() > MAX_CALLBACK_DATA_BYTES {
        return Err(anyhow!(
            "Callback data is {} bytes, limit is {}",
            data.len(),
            MAX_CALLBACK_DATA_BYTES
        ));
    }

    Ok(())
}

/// Event tokens travel inside callback payloads after a `kind:` prefix.
pub fn validate_event_token(token: &str) -> Result<()> {
    if token.is_empty() {
        return Err(anyhow!("Event token cannot be empty"));
    }

    if token.contains(char::is_whitespace) {
        return Err(anyhow!("Event token cannot contain whitespace"));
    }

    Ok(())
}
