//! # Calendar Chat Bot
//!
//! A Telegram front end for a calendar service.
//!
//! ## Features
//! - `/today`, `/next` and `/date` listings with expandable event cards
//! - Step-by-step event creation from free text, with a draft action menu
//! - Per-user dialog state in SQLite or in process memory
//! - Confirmation before calendar contents are shown in group chats

/// Bot command handlers and message processing
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// Key-value storage, connections, and migrations
pub mod database;
/// The event-creation wizard and date dialog, free of I/O
pub mod dialog;
/// Error taxonomy
pub mod error;
/// Calendar and date parser clients, stores and background services
pub mod services;
/// Utility functions for datetime, validation, and formatting
pub mod utils;
