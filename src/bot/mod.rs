/// Command definitions and the logic behind each command
pub mod commands;
/// Shared handler dependencies
pub mod context;
/// Teloxide endpoints, free-text dialog driver and callback dispatcher
pub mod handlers;
/// Inline and reply keyboards
pub mod keyboards;
/// Output port and its Telegram implementation
pub mod render;
/// User-facing strings
pub mod texts;

pub use context::AppContext;

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;
