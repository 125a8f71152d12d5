//! Sensor Reading Model and Store Contract

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::StorageError;

/// A persisted sensor reading.
///
/// Immutable once written; the id and timestamp are assigned by the store
/// at insert time.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SensorReading {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub primary_gas_ppm: f64,
    pub secondary_gas_ppm: f64,
    pub temperature: f64,
    pub humidity: f64,
}

/// Sensor values as submitted by a device, before persistence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NewReading {
    pub primary_gas_ppm: f64,
    pub secondary_gas_ppm: f64,
    pub temperature: f64,
    pub humidity: f64,
}

/// Contract for the append-only reading log.
///
/// `query_range` must return readings with `timestamp >= since` in ascending
/// timestamp order, reflecting every insert committed before the call began.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Append a reading with a store-assigned timestamp, returning its id.
    async fn insert(&self, reading: NewReading) -> Result<i64, StorageError>;

    /// Fetch all readings at or after `since`, ascending by timestamp.
    async fn query_range(&self, since: DateTime<Utc>) -> Result<Vec<SensorReading>, StorageError>;

    /// Total number of stored readings.
    async fn count(&self) -> Result<i64, StorageError>;
}
