//! Escalation configuration

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Escalation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationConfig {
    /// Hazard threshold for the primary gas, inclusive (ppm)
    pub threshold_ppm: f64,
    /// Minimum time between alerts (seconds)
    pub cooldown_secs: u64,
    /// Trailing evaluation window (seconds)
    pub window_secs: u64,
    /// Minimum age of the oldest in-window reading for the hazard to count
    /// as sustained (seconds)
    pub min_span_secs: u64,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            threshold_ppm: 50.0,
            cooldown_secs: 600, // 10 minutes
            window_secs: 120,
            min_span_secs: 110, // 1 minute 50 seconds
        }
    }
}

impl EscalationConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::seconds(self.cooldown_secs as i64)
    }

    pub fn window(&self) -> Duration {
        Duration::seconds(self.window_secs as i64)
    }

    pub fn min_span(&self) -> Duration {
        Duration::seconds(self.min_span_secs as i64)
    }
}
