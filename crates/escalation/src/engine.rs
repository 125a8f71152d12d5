//! Escalation Engine Implementation

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use storage::{ReadingStore, SensorReading};

use crate::config::EscalationConfig;
use crate::gate::AlertGate;
use crate::notifier::Notifier;

/// Stateful sustained-hazard evaluator.
///
/// Invoked after each reading is durably recorded, detached from the
/// ingestion response. The gate mutex is the only critical section; no lock
/// is held across the store query or the notifier call.
pub struct Engine {
    config: EscalationConfig,
    gate: AlertGate,
    store: Arc<dyn ReadingStore>,
    notifier: Arc<dyn Notifier>,
}

impl Engine {
    /// Create an engine with a fresh gate (no prior alert).
    pub fn new(
        config: EscalationConfig,
        store: Arc<dyn ReadingStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            gate: AlertGate::new(),
            store,
            notifier,
        }
    }

    /// The cooldown gate, exposed for status reporting.
    pub fn gate(&self) -> &AlertGate {
        &self.gate
    }

    /// Evaluate against the current wall clock.
    pub async fn evaluate(&self) {
        self.evaluate_at(Utc::now()).await;
    }

    /// Evaluate at an explicit instant.
    ///
    /// Never returns an error: a failed store query skips this evaluation
    /// (the next reading retries naturally) and the notifier outcome is not
    /// interpreted.
    pub async fn evaluate_at(&self, now: DateTime<Utc>) {
        if self.gate.in_cooldown(now, self.config.cooldown()) {
            debug!("Evaluation suppressed: in cooldown period");
            return;
        }

        let since = now - self.config.window();
        let readings = match self.store.query_range(since).await {
            Ok(readings) => readings,
            Err(err) => {
                warn!(error = %err, "Evaluation skipped: reading store unavailable");
                return;
            }
        };

        let Some(current_ppm) = window_verdict(&readings, now, &self.config) else {
            return;
        };

        // Decisive re-check: concurrent evaluations may both reach this
        // point, but only one arms the gate per cooldown period.
        if !self.gate.try_arm(now, self.config.cooldown()) {
            return;
        }

        warn!(current_ppm, "Sustained hazard detected, escalating");
        self.notifier.escalate(current_ppm);
    }
}

/// Pure trigger decision over one window of readings.
///
/// Returns the most recent reading's primary gas value when every reading
/// is at or above the threshold (inclusive) and the oldest reading is at
/// least `min_span` older than `now` (inclusive). An empty window is
/// insufficient data, not a cleared hazard.
pub fn window_verdict(
    readings: &[SensorReading],
    now: DateTime<Utc>,
    config: &EscalationConfig,
) -> Option<f64> {
    if readings.is_empty() {
        debug!("No readings in window");
        return None;
    }

    // The store contract promises ascending order; sort anyway so the span
    // check cannot be fooled by an out-of-order batch.
    let mut ordered: Vec<&SensorReading> = readings.iter().collect();
    ordered.sort_by_key(|r| r.timestamp);

    let consistently_high = ordered
        .iter()
        .all(|r| r.primary_gas_ppm >= config.threshold_ppm);
    if !consistently_high {
        debug!("Trigger voided: reading below threshold in window");
        return None;
    }

    let oldest = ordered.first()?;
    if now - oldest.timestamp < config.min_span() {
        debug!("Trigger voided: window span too short to call sustained");
        return None;
    }

    ordered.last().map(|r| r.primary_gas_ppm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use proptest::prelude::*;
    use std::sync::Mutex;
    use storage::{MemoryStore, NewReading, StorageError};

    /// Notifier capturing every escalation value.
    struct RecordingNotifier {
        calls: Mutex<Vec<f64>>,
    }

    impl RecordingNotifier {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<f64> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn escalate(&self, current_ppm: f64) {
            self.calls.lock().unwrap().push(current_ppm);
        }
    }

    /// Store whose queries always fail.
    struct FailingStore;

    #[async_trait]
    impl ReadingStore for FailingStore {
        async fn insert(&self, _reading: NewReading) -> Result<i64, StorageError> {
            Err(StorageError::LockPoisoned)
        }

        async fn query_range(
            &self,
            _since: DateTime<Utc>,
        ) -> Result<Vec<SensorReading>, StorageError> {
            Err(StorageError::LockPoisoned)
        }

        async fn count(&self) -> Result<i64, StorageError> {
            Err(StorageError::LockPoisoned)
        }
    }

    fn reading_at(ppm: f64) -> NewReading {
        NewReading {
            primary_gas_ppm: ppm,
            secondary_gas_ppm: 5.0,
            temperature: 22.0,
            humidity: 40.0,
        }
    }

    /// Readings at t=0, 30s, 60s, 90s, 110s relative to `base`.
    fn seed_sustained(store: &MemoryStore, base: DateTime<Utc>, ppm: f64) {
        for offset in [0, 30, 60, 90, 110] {
            store
                .insert_at(base + Duration::seconds(offset), reading_at(ppm))
                .unwrap();
        }
    }

    fn engine_with(store: Arc<MemoryStore>) -> (Engine, Arc<RecordingNotifier>) {
        let notifier = RecordingNotifier::new();
        let engine = Engine::new(EscalationConfig::default(), store, notifier.clone());
        (engine, notifier)
    }

    #[tokio::test]
    async fn test_sustained_window_triggers_once_with_latest_value() {
        let store = Arc::new(MemoryStore::new());
        let base = Utc::now() - Duration::minutes(30);
        seed_sustained(&store, base, 55.0);

        let (engine, notifier) = engine_with(store);
        let now = base + Duration::seconds(120);
        engine.evaluate_at(now).await;

        assert_eq!(notifier.calls(), vec![55.0]);
        assert_eq!(engine.gate().last_alert_time(), Some(now));
    }

    #[tokio::test]
    async fn test_single_dip_voids_trigger() {
        let store = Arc::new(MemoryStore::new());
        let base = Utc::now() - Duration::minutes(30);
        for (offset, ppm) in [(0, 55.0), (30, 55.0), (60, 40.0), (90, 55.0), (110, 55.0)] {
            store
                .insert_at(base + Duration::seconds(offset), reading_at(ppm))
                .unwrap();
        }

        let (engine, notifier) = engine_with(store);
        engine.evaluate_at(base + Duration::seconds(120)).await;

        assert!(notifier.calls().is_empty());
        assert_eq!(engine.gate().last_alert_time(), None);
    }

    #[tokio::test]
    async fn test_empty_window_never_triggers() {
        let store = Arc::new(MemoryStore::new());
        let (engine, notifier) = engine_with(store);
        engine.evaluate_at(Utc::now()).await;

        assert!(notifier.calls().is_empty());
        assert_eq!(engine.gate().last_alert_time(), None);
    }

    #[tokio::test]
    async fn test_threshold_is_inclusive() {
        let store = Arc::new(MemoryStore::new());
        let base = Utc::now() - Duration::minutes(30);
        seed_sustained(&store, base, 50.0);

        let (engine, notifier) = engine_with(store);
        engine.evaluate_at(base + Duration::seconds(120)).await;
        assert_eq!(notifier.calls(), vec![50.0]);
    }

    #[tokio::test]
    async fn test_just_below_threshold_does_not_trigger() {
        let store = Arc::new(MemoryStore::new());
        let base = Utc::now() - Duration::minutes(30);
        seed_sustained(&store, base, 49.999);

        let (engine, notifier) = engine_with(store);
        engine.evaluate_at(base + Duration::seconds(120)).await;
        assert!(notifier.calls().is_empty());
    }

    #[tokio::test]
    async fn test_span_boundary_is_inclusive() {
        let now = Utc::now();
        let store = Arc::new(MemoryStore::new());
        // Oldest reading exactly 1:50 old: span check passes.
        store
            .insert_at(now - Duration::seconds(110), reading_at(60.0))
            .unwrap();
        store
            .insert_at(now - Duration::seconds(10), reading_at(61.0))
            .unwrap();

        let (engine, notifier) = engine_with(store);
        engine.evaluate_at(now).await;
        assert_eq!(notifier.calls(), vec![61.0]);
    }

    #[tokio::test]
    async fn test_thin_window_fails_span_check() {
        let now = Utc::now();
        let store = Arc::new(MemoryStore::new());
        // Oldest reading only 1:49 old.
        store
            .insert_at(now - Duration::seconds(109), reading_at(60.0))
            .unwrap();
        store
            .insert_at(now - Duration::seconds(10), reading_at(61.0))
            .unwrap();

        let (engine, notifier) = engine_with(store);
        engine.evaluate_at(now).await;
        assert!(notifier.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cooldown_suppresses_regardless_of_readings() {
        let store = Arc::new(MemoryStore::new());
        let base = Utc::now() - Duration::minutes(30);
        seed_sustained(&store, base, 80.0);

        let (engine, notifier) = engine_with(store);
        let first = base + Duration::seconds(120);
        engine.evaluate_at(first).await;
        assert_eq!(notifier.calls().len(), 1);

        // Still hazardous nine minutes later, but inside the cooldown.
        engine.evaluate_at(first + Duration::minutes(9)).await;
        assert_eq!(notifier.calls().len(), 1);
        assert_eq!(engine.gate().last_alert_time(), Some(first));
    }

    #[tokio::test]
    async fn test_retriggers_after_cooldown_elapses() {
        let store = Arc::new(MemoryStore::new());
        let base = Utc::now() - Duration::minutes(60);
        seed_sustained(&store, base, 80.0);

        let (engine, notifier) = engine_with(store.clone());
        let first = base + Duration::seconds(120);
        engine.evaluate_at(first).await;
        assert_eq!(notifier.calls().len(), 1);

        // Hazard persists; a second sustained window sits under the later
        // evaluation instant.
        let second = first + Duration::minutes(10);
        seed_sustained(&store, second - Duration::seconds(120), 82.0);
        engine.evaluate_at(second).await;

        assert_eq!(notifier.calls().len(), 2);
        assert_eq!(engine.gate().last_alert_time(), Some(second));
    }

    #[tokio::test]
    async fn test_store_failure_skips_evaluation() {
        let notifier = RecordingNotifier::new();
        let engine = Engine::new(
            EscalationConfig::default(),
            Arc::new(FailingStore),
            notifier.clone(),
        );
        engine.evaluate_at(Utc::now()).await;

        assert!(notifier.calls().is_empty());
        assert_eq!(engine.gate().last_alert_time(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_evaluations_trigger_at_most_once() {
        let store = Arc::new(MemoryStore::new());
        let base = Utc::now() - Duration::minutes(30);
        seed_sustained(&store, base, 70.0);

        let notifier = RecordingNotifier::new();
        let engine = Arc::new(Engine::new(
            EscalationConfig::default(),
            store,
            notifier.clone(),
        ));

        let now = base + Duration::seconds(120);
        let mut tasks = Vec::new();
        for _ in 0..8 {
            let engine = engine.clone();
            tasks.push(tokio::spawn(async move {
                engine.evaluate_at(now).await;
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(notifier.calls().len(), 1);
    }

    fn reading_stub(offset_secs: i64, ppm: f64, base: DateTime<Utc>) -> SensorReading {
        SensorReading {
            id: offset_secs,
            timestamp: base + Duration::seconds(offset_secs),
            primary_gas_ppm: ppm,
            secondary_gas_ppm: 0.0,
            temperature: 20.0,
            humidity: 50.0,
        }
    }

    proptest! {
        /// Any below-threshold reading anywhere in the window voids the verdict.
        #[test]
        fn any_dip_voids_verdict(
            high in proptest::collection::vec(50.0f64..500.0, 1..20),
            dip in 0.0f64..49.99,
            dip_pos in 0usize..20,
        ) {
            let base = Utc::now() - Duration::minutes(30);
            let config = EscalationConfig::default();

            let mut readings: Vec<SensorReading> = high
                .iter()
                .enumerate()
                .map(|(i, &ppm)| reading_stub(i as i64 * 5, ppm, base))
                .collect();
            let pos = dip_pos.min(readings.len());
            readings.insert(pos, reading_stub(1 + pos as i64 * 5, dip, base));

            let now = base + Duration::seconds(120);
            prop_assert!(window_verdict(&readings, now, &config).is_none());
        }
    }
}
