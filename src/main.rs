//! # Calendar Chat Bot Main Entry Point
//!
//! Initializes logging, loads configuration, opens the key-value store,
//! starts the correlation janitor and the health server, and runs the
//! Telegram bot.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use calendar_chat_bot::bot::handlers::BotHandler;
use calendar_chat_bot::bot::AppContext;
use calendar_chat_bot::config::Config;
use calendar_chat_bot::database::connection::DatabaseManager;
use calendar_chat_bot::database::{InMemoryKvStore, KvStore, SqliteKvStore};
use calendar_chat_bot::services::calendar::HttpCalendarClient;
use calendar_chat_bot::services::correlation::CorrelationStore;
use calendar_chat_bot::services::date_parser::HttpDateResolver;
use calendar_chat_bot::services::health::HealthService;
use calendar_chat_bot::services::janitor::JanitorService;
use calendar_chat_bot::services::session_store::SessionStore;
use calendar_chat_bot::utils::logging::log_system_event;

async fn open_store(config: &Config) -> Result<Arc<dyn KvStore>> {
    if config.uses_memory_store() {
        log_system_event("store", Some("using in-memory store, state is lost on restart"));
        return Ok(Arc::new(InMemoryKvStore::new()));
    }

    info!("Initializing database connection...");
    let db_manager = DatabaseManager::new(&config.database_url).await?;
    info!("Running database migrations...");
    db_manager.run_migrations().await?;
    info!("Database initialized successfully");
    Ok(Arc::new(SqliteKvStore::new(db_manager)))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "calendar_chat_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting Calendar Chat Bot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded - Store: {}, HTTP Port: {}, Parser: {}, Calendar: {}",
        config.database_url, config.http_port, config.parser_url, config.calendar_api_url
    );

    let store = open_store(&config).await?;
    let timeout = Duration::from_secs(config.http_timeout_secs);
    let resolver = HttpDateResolver::new(&config.parser_url, timeout)?;
    let calendar = HttpCalendarClient::new(&config.calendar_api_url, timeout)?;

    let ctx = AppContext {
        sessions: SessionStore::new(store.clone()),
        correlations: CorrelationStore::new(store.clone()),
        resolver: Arc::new(resolver),
        calendar: Arc::new(calendar),
        timezone: config.timezone.clone(),
    };

    info!("Initializing Telegram bot...");
    let bot = Bot::new(&config.telegram_bot_token);
    let handler = BotHandler::new(ctx.clone());

    let mut janitor = JanitorService::new(ctx.correlations.clone(), config.correlation_ttl_days)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create janitor: {}", e))?;
    if let Err(e) = janitor.start().await {
        tracing::error!("Failed to start janitor: {}", e);
    }

    let health_service = HealthService::new(store);
    let router = health_service
        .router
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", config.http_port, e))?;

    info!("Health check server starting on port {}", config.http_port);

    let bot_task = tokio::spawn(async move {
        Dispatcher::builder(bot, handler.schema())
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    });

    let health_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!("Health server error: {}", e);
        }
    });

    tokio::select! {
        result = bot_task => {
            if let Err(e) = result {
                tracing::error!("Bot task error: {}", e);
            }
        }
        result = health_task => {
            if let Err(e) = result {
                tracing::error!("Health task error: {}", e);
            }
        }
    }

    if let Err(e) = janitor.stop().await {
        tracing::warn!("Error stopping janitor: {}", e);
    }

    log_system_event("shutdown", None);
    Ok(())
}
