use tracing::{debug, error, info, warn};

/// Logs command start with consistent format
pub fn log_command_start(command: &str, user_id: u64, chat_id: i64, details: Option<&str>) {
    match details {
        Some(d) => info!("CMD_START: {} by {} in chat {} - {}", command, user_id, chat_id, d),
        None => info!("CMD_START: {} by {} in chat {}", command, user_id, chat_id),
    }
}

/// Logs command completion with consistent format
pub fn log_command_success(command: &str, user_id: u64, chat_id: i64, details: Option<&str>) {
    match details {
        Some(d) => info!("CMD_SUCCESS: {} by {} in chat {} - {}", command, user_id, chat_id, d),
        None => info!("CMD_SUCCESS: {} by {} in chat {}", command, user_id, chat_id),
    }
}

/// Logs command errors with consistent format
pub fn log_command_error(command: &str, user_id: u64, chat_id: i64, error: &str) {
    error!("CMD_ERROR: {} by {} in chat {} - {}", command, user_id, chat_id, error);
}

/// Logs one step of a multi-turn dialog
pub fn log_dialog_step(user_id: u64, step: &str, outcome: &str) {
    debug!("DIALOG: user {} at step {} - {}", user_id, step, outcome);
}

/// Logs an inline button press
pub fn log_callback(action: &str, presser_id: u64, chat_id: i64) {
    info!("CALLBACK: {} by {} in chat {}", action, presser_id, chat_id);
}

/// Logs a button press rejected by the ownership check
pub fn log_permission_denied(action: &str, presser_id: u64, owner_id: Option<u64>) {
    warn!(
        "PERMISSION_DENIED: {} by {} on prompt owned by {:?}",
        action, presser_id, owner_id
    );
}

/// Logs key-value store failures with consistent format
pub fn log_store_error(operation: &str, key: &str, error: &str) {
    error!("STORE_ERROR: {} on {} failed: {}", operation, key, error);
}

/// Logs failures of the calendar backend or the date parser
pub fn log_external_error(service: &str, operation: &str, error: &str) {
    error!("EXTERNAL_ERROR: {} {} failed: {}", service, operation, error);
}

/// Logs system events with consistent format
pub fn log_system_event(event: &str, details: Option<&str>) {
    match details {
        Some(d) => info!("SYSTEM: {} - {}", event, d),
        None => info!("SYSTEM: {}", event),
    }
}
