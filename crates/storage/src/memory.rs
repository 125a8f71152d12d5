//! In-Memory Store Implementation

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::reading::{NewReading, ReadingStore, SensorReading};
use crate::StorageError;

/// In-memory reading log with a bounded retention window.
///
/// Used by the escalation engine's tests and as a fallback when no database
/// file is configured. Oldest readings are evicted once the cap is reached.
pub struct MemoryStore {
    log: Mutex<VecDeque<SensorReading>>,
    next_id: Mutex<i64>,
    max_records: usize,
}

impl MemoryStore {
    /// Create a new in-memory store with the default retention cap.
    pub fn new() -> Self {
        Self::with_capacity(100_000)
    }

    /// Create a new in-memory store retaining at most `max_records` readings.
    pub fn with_capacity(max_records: usize) -> Self {
        info!(max_records, "Creating in-memory reading store");
        Self {
            log: Mutex::new(VecDeque::with_capacity(1024)),
            next_id: Mutex::new(1),
            max_records,
        }
    }

    /// Append a reading with an explicit timestamp.
    ///
    /// Lets tests place readings at controlled instants; the production path
    /// goes through [`ReadingStore::insert`].
    pub fn insert_at(
        &self,
        timestamp: DateTime<Utc>,
        reading: NewReading,
    ) -> Result<i64, StorageError> {
        let mut next_id = self.next_id.lock().map_err(|_| StorageError::LockPoisoned)?;
        let id = *next_id;
        *next_id += 1;

        let mut log = self.log.lock().map_err(|_| StorageError::LockPoisoned)?;
        while log.len() >= self.max_records {
            log.pop_front();
        }
        log.push_back(SensorReading {
            id,
            timestamp,
            primary_gas_ppm: reading.primary_gas_ppm,
            secondary_gas_ppm: reading.secondary_gas_ppm,
            temperature: reading.temperature,
            humidity: reading.humidity,
        });
        Ok(id)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReadingStore for MemoryStore {
    async fn insert(&self, reading: NewReading) -> Result<i64, StorageError> {
        self.insert_at(Utc::now(), reading)
    }

    async fn query_range(&self, since: DateTime<Utc>) -> Result<Vec<SensorReading>, StorageError> {
        let log = self.log.lock().map_err(|_| StorageError::LockPoisoned)?;
        let mut readings: Vec<_> = log
            .iter()
            .filter(|r| r.timestamp >= since)
            .cloned()
            .collect();
        readings.sort_by_key(|r| r.timestamp);
        Ok(readings)
    }

    async fn count(&self) -> Result<i64, StorageError> {
        let log = self.log.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(log.len() as i64)
    }
}
