//! Payload Validator for Range Checking

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Primary gas (CO proxy) valid range (ppm)
    pub primary_gas_range: (f64, f64),
    /// Secondary gas valid range (ppm)
    pub secondary_gas_range: (f64, f64),
    /// Temperature valid range (°C)
    pub temperature_range: (f64, f64),
    /// Relative humidity valid range (%)
    pub humidity_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            primary_gas_range: (0.0, 10_000.0),
            secondary_gas_range: (0.0, 10_000.0),
            temperature_range: (-40.0, 125.0),
            humidity_range: (0.0, 100.0),
        }
    }
}

/// Validator for gas telemetry payloads
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite { field });
        }
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Validate primary gas concentration
    pub fn validate_primary_gas(&self, ppm: f64) -> Result<(), ValidationError> {
        self.validate_range("primary_gas_ppm", ppm, self.config.primary_gas_range)
    }

    /// Validate secondary gas concentration
    pub fn validate_secondary_gas(&self, ppm: f64) -> Result<(), ValidationError> {
        self.validate_range("secondary_gas_ppm", ppm, self.config.secondary_gas_range)
    }

    /// Validate temperature
    pub fn validate_temperature(&self, temp: f64) -> Result<(), ValidationError> {
        self.validate_range("temperature", temp, self.config.temperature_range)
    }

    /// Validate relative humidity
    pub fn validate_humidity(&self, humidity: f64) -> Result<(), ValidationError> {
        self.validate_range("humidity", humidity, self.config.humidity_range)
    }

    /// Validate a full telemetry sample, returning the first failure
    pub fn validate_sample(
        &self,
        primary_gas_ppm: f64,
        secondary_gas_ppm: f64,
        temperature: f64,
        humidity: f64,
    ) -> Result<(), ValidationError> {
        self.validate_primary_gas(primary_gas_ppm)?;
        self.validate_secondary_gas(secondary_gas_ppm)?;
        self.validate_temperature(temperature)?;
        self.validate_humidity(humidity)?;
        Ok(())
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
