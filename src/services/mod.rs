/// Calendar backend client
pub mod calendar;
/// Event uid to calendar uid mapping behind the "more" buttons
pub mod correlation;
/// Free-text date resolution
pub mod date_parser;
/// HTTP health endpoints
pub mod health;
/// Scheduled eviction of stale correlation entries
pub mod janitor;
/// Per-user dialog state persistence
pub mod session_store;
