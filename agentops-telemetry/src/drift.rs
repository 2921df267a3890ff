//! Drift signals and the observers that receive them.

use std::sync::{Arc, Mutex, PoisonError};

use agentops_primitives::{DriftThreshold, SessionId};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Notification emitted when an event's latency deviates beyond the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftSignal {
    /// Action label of the offending event.
    pub action_type: String,
    /// Session the event belongs to, when known.
    pub session_id: Option<SessionId>,
    /// Mean latency captured by the baseline.
    pub baseline_latency_ms: f64,
    /// Latency of the offending event.
    pub current_latency_ms: f64,
    /// `|current - baseline| / baseline`.
    pub deviation_fraction: f64,
    /// Threshold the deviation exceeded.
    pub threshold: DriftThreshold,
}

/// Observer invoked for every drift signal.
pub trait DriftObserver: Send + Sync {
    /// Receives the supplied signal. Must not block for long.
    ///
    /// A panic raised here is caught and logged; the remaining observers
    /// still receive the signal and the event is recorded regardless.
    fn on_drift(&self, signal: &DriftSignal);
}

/// Observer that emits drift signals to the tracing system.
#[derive(Debug, Default)]
pub struct TracingDriftObserver;

impl DriftObserver for TracingDriftObserver {
    fn on_drift(&self, signal: &DriftSignal) {
        warn!(
            action_type = %signal.action_type,
            session_id = ?signal.session_id,
            baseline_latency_ms = signal.baseline_latency_ms,
            current_latency_ms = signal.current_latency_ms,
            deviation = format_args!("{:.1}%", signal.deviation_fraction * 100.0),
            threshold = %signal.threshold,
            "latency drift detected"
        );
    }
}

/// Observer that keeps every signal, used by tests and reporting layers.
#[derive(Debug, Default)]
pub struct CollectingDriftObserver {
    signals: Mutex<Vec<DriftSignal>>,
}

impl CollectingDriftObserver {
    /// Creates a new collecting observer.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns a copy of the collected signals.
    #[must_use]
    pub fn signals(&self) -> Vec<DriftSignal> {
        self.signals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Removes and returns the collected signals.
    #[must_use]
    pub fn drain(&self) -> Vec<DriftSignal> {
        let mut lock = self.signals.lock().unwrap_or_else(PoisonError::into_inner);
        lock.drain(..).collect()
    }
}

impl DriftObserver for CollectingDriftObserver {
    fn on_drift(&self, signal: &DriftSignal) {
        self.signals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(signal.clone());
    }
}
