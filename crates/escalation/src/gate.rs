//! Cooldown Gate

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// Cooldown state machine guarding the check-then-act trigger sequence.
///
/// Concurrent evaluations may race past the read-only pre-check; `try_arm`
/// is the decisive gate and admits at most one caller per cooldown period.
/// `last_alert_time` never regresses.
pub struct AlertGate {
    last_alert: Mutex<Option<DateTime<Utc>>>,
}

impl AlertGate {
    /// Create a gate with no prior alert recorded.
    pub fn new() -> Self {
        Self {
            last_alert: Mutex::new(None),
        }
    }

    /// Cheap read-only pre-check: true while a prior alert suppresses new ones.
    pub fn in_cooldown(&self, now: DateTime<Utc>, cooldown: Duration) -> bool {
        self.last_alert_time()
            .map(|last| now - last < cooldown)
            .unwrap_or(false)
    }

    /// Atomically re-check the cooldown and record `now` as the alert time.
    ///
    /// Returns false when a prior alert is still within `cooldown` of `now`,
    /// including the case where `now` is not newer than the stored instant.
    pub fn try_arm(&self, now: DateTime<Utc>, cooldown: Duration) -> bool {
        let mut last = self.lock();
        match *last {
            Some(prev) if now - prev < cooldown => {
                debug!("Alert suppressed: in cooldown period");
                false
            }
            _ => {
                *last = Some(now);
                true
            }
        }
    }

    /// Instant of the most recent alert, if any.
    pub fn last_alert_time(&self) -> Option<DateTime<Utc>> {
        *self.lock()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<DateTime<Utc>>> {
        // A poisoned lock can only leave a fully-written Option behind.
        self.last_alert
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for AlertGate {
    fn default() -> Self {
        Self::new()
    }
}
