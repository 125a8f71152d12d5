//! Gas Safety Hub API Server
//!
//! HTTP ingestion endpoint and health check for the edge safety listener.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod error;
pub mod routes;
mod settings;

pub use error::ApiError;
pub use settings::Settings;

use data_validator::Validator;
use escalation::{ConsoleNotifier, Engine, EscalationConfig};
use storage::{ReadingStore, SqliteStore};

/// Application state shared across handlers
pub struct AppState {
    /// Reading log
    pub store: Arc<dyn ReadingStore>,
    /// Escalation engine, evaluated after each ingestion
    pub engine: Arc<Engine>,
    /// Payload validator
    pub validator: Validator,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create application state around a reading store, wiring the engine
    /// to the console notifier placeholder.
    pub fn new(store: Arc<dyn ReadingStore>, config: EscalationConfig) -> Self {
        let engine = Arc::new(Engine::new(
            config,
            store.clone(),
            Arc::new(ConsoleNotifier),
        ));
        Self {
            store,
            engine,
            validator: Validator::default(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub system: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub readings_logged: i64,
    pub last_alert_time: Option<DateTime<Utc>>,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ingest", post(routes::ingest::ingest))
        .route("/api/v1/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readings_logged = state.store.count().await.unwrap_or(0);

    Json(HealthResponse {
        status: "active".to_string(),
        system: "IOT-Safety-Hub Listener".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        readings_logged,
        last_alert_time: state.engine.gate().last_alert_time(),
    })
}

/// Initialize logging
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();
}

/// Run the server with the given settings until shutdown.
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let store = Arc::new(SqliteStore::connect(&settings.database_url).await?);
    let state = Arc::new(AppState::new(store, settings.escalation.clone()));
    let app = create_router(state);

    info!(addr = %settings.bind_addr, "Starting safety hub API server");

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
