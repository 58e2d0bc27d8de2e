use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::database::KvStore;
use crate::services::correlation::CORRELATION_PREFIX;
use crate::services::session_store::SESSION_PREFIX;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub store: StoreHealth,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoreHealth {
    pub status: String,
    pub sessions: Option<u64>,
    pub correlations: Option<u64>,
    pub response_time_ms: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KvStore>,
    pub start_time: DateTime<Utc>,
}

pub struct HealthService {
    pub router: Router,
}

impl HealthService {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        let state = AppState {
            store,
            start_time: Utc::now(),
        };

        let router = Router::new()
            .route("/health", get(health_check))
            .route("/health/ready", get(readiness_check))
            .route("/health/live", get(liveness_check))
            .with_state(state);

        Self { router }
    }
}

async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, StatusCode> {
    let start = std::time::Instant::now();

    let healthy = state.store.ping().await.is_ok();
    let sessions = state.store.count(SESSION_PREFIX).await.ok();
    let correlations = state.store.count(CORRELATION_PREFIX).await.ok();

    let response_time_ms = start.elapsed().as_millis() as u64;
    let uptime = Utc::now()
        .signed_duration_since(state.start_time)
        .num_seconds()
        .max(0) as u64;

    if !healthy {
        tracing::warn!("Health check failed: key-value store unreachable");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: StoreHealth {
            status: "healthy".to_string(),
            sessions,
            correlations,
            response_time_ms,
        },
        uptime_seconds: uptime,
    }))
}

async fn readiness_check(State(state): State<AppState>) -> Result<Json<&'static str>, StatusCode> {
    match state.store.ping().await {
        Ok(()) => Ok(Json("ready")),
        Err(_) => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}

async fn liveness_check() -> Json<&'static str> {
    Json("alive")
}
