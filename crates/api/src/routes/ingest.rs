//! Ingestion Route

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiError;
use crate::AppState;
use storage::NewReading;

/// JSON body expected from a field device.
#[derive(Debug, Deserialize)]
pub struct TelemetryPayload {
    pub primary_gas_ppm: f64,
    pub secondary_gas_ppm: f64,
    pub temperature: f64,
    pub humidity: f64,
}

/// Acknowledgment returned once the reading is durably logged.
#[derive(Debug, Serialize)]
pub struct IngestAck {
    pub status: String,
    pub message: String,
    pub log_id: i64,
}

/// Ingest one telemetry sample.
///
/// Validates, persists, then schedules the escalation evaluation as a
/// detached task; the acknowledgment never waits on the evaluation.
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TelemetryPayload>,
) -> Result<Json<IngestAck>, ApiError> {
    state.validator.validate_sample(
        payload.primary_gas_ppm,
        payload.secondary_gas_ppm,
        payload.temperature,
        payload.humidity,
    )?;

    let log_id = state
        .store
        .insert(NewReading {
            primary_gas_ppm: payload.primary_gas_ppm,
            secondary_gas_ppm: payload.secondary_gas_ppm,
            temperature: payload.temperature,
            humidity: payload.humidity,
        })
        .await?;
    debug!(log_id, "Reading logged");

    let engine = state.engine.clone();
    tokio::spawn(async move {
        engine.evaluate().await;
    });

    Ok(Json(IngestAck {
        status: "success".to_string(),
        message: "Data securely logged".to_string(),
        log_id,
    }))
}
