//! Notification Channel

use tracing::warn;

/// Sink for a positive escalation decision.
///
/// Implementations are best-effort and possibly slow (a real channel places
/// a voice call); the engine never waits on or interprets the outcome.
pub trait Notifier: Send + Sync {
    /// Escalate with the most recent primary gas reading (ppm).
    fn escalate(&self, current_ppm: f64);
}

/// Console placeholder standing in for the voice-call channel.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn escalate(&self, current_ppm: f64) {
        warn!(current_ppm, "CRITICAL ALERT: primary gas consistently high");
        warn!("Initiating automated escalation protocol");
    }
}
