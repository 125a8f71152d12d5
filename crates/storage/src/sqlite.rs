//! SQLite Store Implementation

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::reading::{NewReading, ReadingStore, SensorReading};
use crate::StorageError;

const SCHEMA: &str = "\
    CREATE TABLE IF NOT EXISTS sensor_logs (\
        id INTEGER PRIMARY KEY AUTOINCREMENT,\
        timestamp TEXT NOT NULL,\
        primary_gas_ppm REAL NOT NULL,\
        secondary_gas_ppm REAL NOT NULL,\
        temperature REAL NOT NULL,\
        humidity REAL NOT NULL\
    )";

const TIMESTAMP_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_sensor_logs_timestamp ON sensor_logs (timestamp)";

/// SQLite-backed reading log.
///
/// Append-only: nothing in this store updates or deletes rows. WAL mode
/// keeps reads from blocking the ingestion writes.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to the database at `url` (e.g. `sqlite://safety_hub_logs.db`),
    /// creating the file and schema if missing.
    pub async fn connect(url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        // A single connection: SQLite serializes writes anyway, and it keeps
        // `sqlite::memory:` URLs pointing at one shared database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::query(SCHEMA).execute(&pool).await?;
        sqlx::query(TIMESTAMP_INDEX).execute(&pool).await?;

        info!(url, "Connected to SQLite reading store");
        Ok(Self { pool })
    }
}

#[async_trait]
impl ReadingStore for SqliteStore {
    async fn insert(&self, reading: NewReading) -> Result<i64, StorageError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO sensor_logs \
             (timestamp, primary_gas_ppm, secondary_gas_ppm, temperature, humidity) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             RETURNING id",
        )
        .bind(Utc::now())
        .bind(reading.primary_gas_ppm)
        .bind(reading.secondary_gas_ppm)
        .bind(reading.temperature)
        .bind(reading.humidity)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn query_range(&self, since: DateTime<Utc>) -> Result<Vec<SensorReading>, StorageError> {
        let readings = sqlx::query_as::<_, SensorReading>(
            "SELECT id, timestamp, primary_gas_ppm, secondary_gas_ppm, temperature, humidity \
             FROM sensor_logs \
             WHERE timestamp >= ?1 \
             ORDER BY timestamp ASC",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(readings)
    }

    async fn count(&self) -> Result<i64, StorageError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sensor_logs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
