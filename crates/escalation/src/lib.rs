//! Escalation Engine
//!
//! Decides, after every ingested reading, whether a sustained hazardous gas
//! condition warrants escalation. Combines a trailing-window consistency
//! check with a cooldown state machine so an ongoing hazard produces one
//! alert per cooldown period instead of one per reading.

mod config;
mod engine;
mod gate;
mod notifier;

pub use config::EscalationConfig;
pub use engine::{window_verdict, Engine};
pub use gate::AlertGate;
pub use notifier::{ConsoleNotifier, Notifier};
