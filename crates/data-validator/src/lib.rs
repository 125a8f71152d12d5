//! Data Validation
//!
//! Provides input validation and range checking for incoming gas telemetry.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{ValidationConfig, Validator};
