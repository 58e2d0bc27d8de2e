use anyhow::{anyhow, Result};
use chrono_tz::Tz;
use std::env;

/// Runtime configuration read from the environment (optionally via `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub database_url: String,
    pub http_port: u16,
    pub parser_url: String,
    pub calendar_api_url: String,
    pub timezone: String,
    pub http_timeout_secs: u64,
    pub correlation_ttl_days: i64,
}

/// `DATABASE_URL` value that selects the non-persistent in-memory store.
pub const MEMORY_DATABASE_URL: &str = "memory";

const DEFAULT_DATABASE_URL: &str = "sqlite:./data/calendar_bot.db";

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;

        if token.trim().is_empty() {
            return Err(anyhow!("TELEGRAM_BOT_TOKEN must be set"));
        }

        let database_url = database_url_from_env();

        let http_port = parse_number("HTTP_PORT", "3000")?;
        let http_timeout_secs: u64 = parse_number("HTTP_TIMEOUT_SECS", "10")?;
        if http_timeout_secs == 0 {
            return Err(anyhow!("Invalid HTTP_TIMEOUT_SECS"));
        }
        let correlation_ttl_days: i64 = parse_number("CORRELATION_TTL_DAYS", "30")?;
        if correlation_ttl_days <= 0 {
            return Err(anyhow!("Invalid CORRELATION_TTL_DAYS"));
        }

        let parser_url = non_empty_or(env::var("PARSER_URL").ok(), "http://localhost:8090");
        let calendar_api_url =
            non_empty_or(env::var("CALENDAR_API_URL").ok(), "http://localhost:8080");
        let timezone = non_empty_or(env::var("BOT_TIMEZONE").ok(), "Europe/Moscow");
        if timezone.parse::<Tz>().is_err() {
            return Err(anyhow!("Invalid BOT_TIMEZONE"));
        }

        Ok(Config {
            telegram_bot_token: token,
            database_url,
            http_port,
            parser_url: parser_url.trim_end_matches('/').to_string(),
            calendar_api_url: calendar_api_url.trim_end_matches('/').to_string(),
            timezone,
            http_timeout_secs,
            correlation_ttl_days,
        })
    }

    /// True when sessions and correlation entries should live in process memory.
    pub fn uses_memory_store(&self) -> bool {
        self.database_url.trim() == MEMORY_DATABASE_URL
    }
}

/// `DATABASE_URL` or its default. Usable without the rest of the configuration.
pub fn database_url_from_env() -> String {
    non_empty_or(env::var("DATABASE_URL").ok(), DEFAULT_DATABASE_URL)
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, default: &str) -> Result<T> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse()
        .map_err(|_| anyhow!("Invalid {}", name))
}
