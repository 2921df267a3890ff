//! Baseline capture and per-event drift comparison.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

use agentops_events::{EventRecord, EventStore};
use agentops_primitives::DriftThreshold;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::drift::{DriftObserver, DriftSignal, TracingDriftObserver};
use crate::stats::Totals;

/// Aggregate behaviour captured as "normal" for later comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineSnapshot {
    avg_latency_ms: f64,
    avg_tokens: f64,
    event_count: usize,
    established_at: DateTime<Utc>,
}

impl BaselineSnapshot {
    /// Returns the mean latency of the baseline events.
    #[must_use]
    pub const fn avg_latency_ms(&self) -> f64 {
        self.avg_latency_ms
    }

    /// Returns the mean total token count of the baseline events.
    #[must_use]
    pub const fn avg_tokens(&self) -> f64 {
        self.avg_tokens
    }

    /// Returns how many events the baseline was computed from.
    #[must_use]
    pub const fn event_count(&self) -> usize {
        self.event_count
    }

    /// Returns when the baseline was captured.
    #[must_use]
    pub const fn established_at(&self) -> DateTime<Utc> {
        self.established_at
    }

    /// Relative latency deviation of `latency_ms` from the baseline mean.
    ///
    /// Returns `None` when the baseline mean is zero.
    #[must_use]
    pub fn deviation(&self, latency_ms: f64) -> Option<f64> {
        (self.avg_latency_ms > 0.0)
            .then(|| (latency_ms - self.avg_latency_ms).abs() / self.avg_latency_ms)
    }
}

/// Compares each new event against a captured baseline.
///
/// Starts without a baseline, in which state [`on_event`](Self::on_event) is a
/// no-op. [`establish`](Self::establish) captures or replaces the snapshot.
/// Comparisons only read a copy of the snapshot, so they may run concurrently.
pub struct BaselineComparator {
    threshold: DriftThreshold,
    baseline: RwLock<Option<BaselineSnapshot>>,
    observers: RwLock<Vec<Arc<dyn DriftObserver>>>,
}

impl fmt::Debug for BaselineComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let observers = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("BaselineComparator")
            .field("threshold", &self.threshold)
            .field("baseline", &self.baseline())
            .field("observers", &observers)
            .finish()
    }
}

impl BaselineComparator {
    /// Creates a comparator that reports drift through [`TracingDriftObserver`].
    #[must_use]
    pub fn new(threshold: DriftThreshold) -> Self {
        let tracing: Arc<dyn DriftObserver> = Arc::new(TracingDriftObserver);
        Self::with_observers(threshold, [tracing])
    }

    /// Creates a comparator reporting to exactly the supplied observers.
    #[must_use]
    pub fn with_observers<I>(threshold: DriftThreshold, observers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn DriftObserver>>,
    {
        Self {
            threshold,
            baseline: RwLock::new(None),
            observers: RwLock::new(observers.into_iter().collect()),
        }
    }

    /// Returns the configured threshold.
    #[must_use]
    pub const fn threshold(&self) -> DriftThreshold {
        self.threshold
    }

    /// Adds an observer that receives every subsequent drift signal.
    pub fn subscribe(&self, observer: Arc<dyn DriftObserver>) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    /// Returns the current baseline, if one has been established.
    #[must_use]
    pub fn baseline(&self) -> Option<BaselineSnapshot> {
        *self.baseline.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `true` once a baseline has been established.
    #[must_use]
    pub fn is_established(&self) -> bool {
        self.baseline().is_some()
    }

    /// Captures the store's current aggregate behaviour as the baseline.
    ///
    /// Replaces any previous snapshot. An empty store leaves the comparator
    /// unchanged and returns `None`.
    pub fn establish(&self, store: &EventStore) -> Option<BaselineSnapshot> {
        let totals = store.with_events(Totals::over);
        if totals.count == 0 {
            debug!(
                session_id = %store.session_id(),
                "baseline not established: no events recorded"
            );
            return None;
        }

        let snapshot = BaselineSnapshot {
            avg_latency_ms: totals.mean_latency_ms(),
            avg_tokens: totals.mean_tokens(),
            event_count: totals.count,
            established_at: Utc::now(),
        };
        *self.baseline.write().unwrap_or_else(PoisonError::into_inner) = Some(snapshot);

        info!(
            session_id = %store.session_id(),
            avg_latency_ms = snapshot.avg_latency_ms,
            avg_tokens = snapshot.avg_tokens,
            event_count = snapshot.event_count,
            "baseline established"
        );
        Some(snapshot)
    }

    /// Compares a newly recorded event with the baseline without notifying observers.
    #[must_use]
    pub fn evaluate(&self, event: &EventRecord) -> Option<DriftSignal> {
        let baseline = self.baseline()?;
        let deviation = baseline.deviation(event.latency_ms())?;
        self.threshold
            .is_exceeded_by(deviation)
            .then(|| DriftSignal {
                action_type: event.action_type().to_owned(),
                session_id: event.session_id(),
                baseline_latency_ms: baseline.avg_latency_ms,
                current_latency_ms: event.latency_ms(),
                deviation_fraction: deviation,
                threshold: self.threshold,
            })
    }

    /// Compares a newly recorded event with the baseline and notifies observers on drift.
    ///
    /// Never rejects the event; the returned signal is informational.
    pub fn on_event(&self, event: &EventRecord) -> Option<DriftSignal> {
        let signal = self.evaluate(event)?;
        let observers = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for observer in &observers {
            let delivered = panic::catch_unwind(AssertUnwindSafe(|| observer.on_drift(&signal)));
            if delivered.is_err() {
                warn!(action_type = %signal.action_type, "drift observer panicked");
            }
        }
        Some(signal)
    }
}
