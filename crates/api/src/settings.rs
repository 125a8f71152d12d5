//! Service Configuration

use config::{Config, ConfigError, Environment, File};
use escalation::EscalationConfig;
use serde::Deserialize;

/// Runtime settings, layered from defaults, an optional `safety-hub.toml`,
/// and `SAFETY_HUB_*` environment overrides
/// (e.g. `SAFETY_HUB_ESCALATION__THRESHOLD_PPM=75`).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Listen address for the HTTP server
    pub bind_addr: String,
    /// SQLite database URL
    pub database_url: String,
    /// Escalation engine tuning
    pub escalation: EscalationConfig,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("bind_addr", "0.0.0.0:8080")?
            .set_default("database_url", "sqlite://safety_hub_logs.db")?
            .set_default("escalation.threshold_ppm", 50.0)?
            .set_default("escalation.cooldown_secs", 600i64)?
            .set_default("escalation.window_secs", 120i64)?
            .set_default("escalation.min_span_secs", 110i64)?
            .add_source(File::with_name("safety-hub").required(false))
            .add_source(Environment::with_prefix("SAFETY_HUB").separator("__"))
            .build()?
            .try_deserialize()
    }
}
