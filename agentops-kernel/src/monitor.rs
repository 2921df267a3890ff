//! Monitor handle tying the event store, statistics and drift detection together.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use agentops_config::MonitorConfig;
use agentops_events::{EventRecord, EventStore, Exporter, JsonFileExporter};
use agentops_primitives::{Session, SessionId};
use agentops_telemetry::{
    ActionStats, BaselineComparator, BaselineSnapshot, DriftObserver, StatsAggregator,
    StatsSnapshot,
};
use tracing::info;

use crate::MonitorResult;
use crate::wrapper::ActionWrapper;

struct MonitorInner {
    config: MonitorConfig,
    store: EventStore,
    comparator: BaselineComparator,
}

/// Cheaply cloneable handle to one monitoring session.
///
/// All clones share the same event store and baseline.
#[derive(Clone)]
pub struct MonitorHandle {
    inner: Arc<MonitorInner>,
}

impl fmt::Debug for MonitorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorHandle")
            .field("session", self.session())
            .field("events", &self.event_count())
            .field("comparator", &self.inner.comparator)
            .finish_non_exhaustive()
    }
}

impl MonitorHandle {
    /// Validates the configuration and starts a new session.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Config`](crate::MonitorError::Config) when the
    /// configuration fails validation.
    pub fn new(config: MonitorConfig) -> MonitorResult<Self> {
        config.validate()?;
        let session = Session::start(config.project_name());
        let comparator = BaselineComparator::new(config.drift_threshold());

        info!(
            project = config.project_name(),
            session_id = %session.id(),
            drift_threshold = %config.drift_threshold(),
            "monitor initialized"
        );

        Ok(Self {
            inner: Arc::new(MonitorInner {
                store: EventStore::new(session),
                comparator,
                config,
            }),
        })
    }

    /// Returns the configuration the monitor was started with.
    #[must_use]
    pub fn config(&self) -> &MonitorConfig {
        &self.inner.config
    }

    /// Returns the active session.
    #[must_use]
    pub fn session(&self) -> &Session {
        self.inner.store.session()
    }

    /// Returns the active session identifier.
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.inner.store.session_id()
    }

    /// Creates a wrapper that instruments operations under `action_type`.
    #[must_use]
    pub fn action(&self, action_type: impl Into<String>) -> ActionWrapper {
        ActionWrapper::new(self.clone(), action_type)
    }

    /// Appends a record to the session and checks it for drift.
    ///
    /// Returns the stored record, stamped with the session id.
    pub fn record(&self, record: EventRecord) -> EventRecord {
        let stored = self.inner.store.append(record);
        self.inner.comparator.on_event(&stored);
        stored
    }

    /// Returns a snapshot of every recorded event in order.
    #[must_use]
    pub fn events(&self) -> Vec<EventRecord> {
        self.inner.store.all()
    }

    /// Returns the number of recorded events.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.inner.store.count()
    }

    /// Returns session statistics, or the no-data sentinel when empty.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        StatsAggregator::snapshot(&self.inner.store)
    }

    /// Returns statistics per action type.
    #[must_use]
    pub fn stats_by_action_type(&self) -> Vec<ActionStats> {
        StatsAggregator::by_action_type(&self.inner.store)
    }

    /// Captures the current events as the drift baseline.
    ///
    /// Returns `None`, leaving any previous baseline in place, when nothing has
    /// been recorded yet.
    pub fn establish_baseline(&self) -> Option<BaselineSnapshot> {
        self.inner.comparator.establish(&self.inner.store)
    }

    /// Waits for `wait` and then captures the baseline.
    ///
    /// Events recorded while waiting are included.
    pub async fn establish_baseline_after(&self, wait: Duration) -> Option<BaselineSnapshot> {
        info!(wait_ms = wait.as_millis(), "establishing baseline");
        tokio::time::sleep(wait).await;
        self.establish_baseline()
    }

    /// Returns the current baseline, if any.
    #[must_use]
    pub fn baseline(&self) -> Option<BaselineSnapshot> {
        self.inner.comparator.baseline()
    }

    /// Registers an additional drift observer.
    pub fn subscribe_drift(&self, observer: Arc<dyn DriftObserver>) {
        self.inner.comparator.subscribe(observer);
    }

    /// Writes every recorded event to `path` as a JSON array, replacing the file.
    ///
    /// Returns the number of exported events.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Export`](crate::MonitorError::Export) when the
    /// file cannot be written.
    pub async fn export_events(&self, path: impl AsRef<Path>) -> MonitorResult<usize> {
        self.export_with(&JsonFileExporter::new(path.as_ref())).await
    }

    /// Sends every recorded event to the supplied exporter.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Export`](crate::MonitorError::Export) when the
    /// exporter fails.
    pub async fn export_with(&self, exporter: &dyn Exporter) -> MonitorResult<usize> {
        let events = self.events();
        exporter.export(&events).await?;
        Ok(events.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentops_config::ConfigError;
    use agentops_telemetry::CollectingDriftObserver;

    use crate::MonitorError;

    fn monitor() -> MonitorHandle {
        MonitorHandle::new(MonitorConfig::new("demo")).unwrap()
    }

    fn event(latency_ms: f64) -> EventRecord {
        EventRecord::builder("search")
            .latency_ms(latency_ms)
            .unwrap()
            .build()
    }

    #[test]
    fn rejects_invalid_config() {
        let err = MonitorHandle::new(MonitorConfig::new(""))
            .expect_err("blank project should be rejected");
        assert!(matches!(err, MonitorError::Config(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn record_stamps_session_and_updates_stats() {
        let monitor = monitor();
        assert!(monitor.stats().is_empty());

        let stored = monitor.record(event(10.0));
        assert_eq!(stored.session_id(), Some(monitor.session_id()));
        monitor.record(event(30.0));

        let snapshot = monitor.stats();
        let stats = snapshot.stats().unwrap();
        assert_eq!(stats.total_events, 2);
        assert_eq!(stats.project_name, "demo");
        assert!((stats.avg_latency_ms - 20.0).abs() < 1e-9);
    }

    #[test]
    fn clones_share_state() {
        let monitor = monitor();
        let clone = monitor.clone();
        clone.record(event(1.0));
        assert_eq!(monitor.event_count(), 1);
        assert_eq!(clone.session_id(), monitor.session_id());
    }

    #[test]
    fn drift_is_checked_after_baseline() {
        let monitor = monitor();
        let observer = CollectingDriftObserver::new();
        monitor.subscribe_drift(observer.clone());

        assert!(monitor.establish_baseline().is_none());
        monitor.record(event(100.0));
        monitor.record(event(500.0));
        assert!(observer.signals().is_empty());

        let baseline = monitor.establish_baseline().unwrap();
        assert!((baseline.avg_latency_ms() - 300.0).abs() < 1e-9);
        assert_eq!(monitor.baseline(), Some(baseline));

        monitor.record(event(310.0));
        let drifted = monitor.record(event(100.0));
        let signals = observer.signals();
        assert_eq!(signals.len(), 1);
        assert!((signals[0].current_latency_ms - 100.0).abs() < f64::EPSILON);
        assert_eq!(signals[0].session_id, drifted.session_id());
        assert_eq!(monitor.event_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_baseline_includes_events_recorded_while_waiting() {
        let monitor = monitor();
        monitor.record(event(100.0));

        let waiting = {
            let monitor = monitor.clone();
            tokio::spawn(async move {
                monitor
                    .establish_baseline_after(Duration::from_secs(300))
                    .await
            })
        };
        tokio::task::yield_now().await;
        monitor.record(event(300.0));

        let baseline = waiting.await.unwrap().unwrap();
        assert_eq!(baseline.event_count(), 2);
        assert!((baseline.avg_latency_ms() - 200.0).abs() < 1e-9);
    }
}
