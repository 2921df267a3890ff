//! Summary statistics over the event store.

use std::collections::BTreeMap;

use agentops_events::{EventRecord, EventStore};
use agentops_primitives::SessionId;
use serde::Serialize;

/// Message carried by [`StatsSnapshot::NoData`].
pub const NO_DATA_MESSAGE: &str = "no data";

/// Aggregate figures for one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Number of recorded events.
    pub total_events: usize,
    /// Fraction of events that succeeded, in `[0, 1]`.
    pub success_rate: f64,
    /// Mean latency over every event, successful or not.
    pub avg_latency_ms: f64,
    /// Owning session.
    pub session_id: SessionId,
    /// Project label of the session.
    pub project_name: String,
}

/// Result of a stats query; empty stores yield [`StatsSnapshot::NoData`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatsSnapshot {
    /// Figures computed over at least one event.
    Data(Stats),
    /// Nothing has been recorded yet.
    NoData {
        /// Always [`NO_DATA_MESSAGE`].
        message: &'static str,
    },
}

impl StatsSnapshot {
    /// Returns the computed figures, if any events exist.
    #[must_use]
    pub fn stats(&self) -> Option<&Stats> {
        match self {
            Self::Data(stats) => Some(stats),
            Self::NoData { .. } => None,
        }
    }

    /// Returns `true` for the no-data sentinel.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::NoData { .. })
    }
}

/// Figures for one action type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionStats {
    /// The action label.
    pub action_type: String,
    /// Number of events with this label.
    pub total_events: usize,
    /// Fraction of those events that succeeded.
    pub success_rate: f64,
    /// Mean latency of those events.
    pub avg_latency_ms: f64,
}

/// Running sums over a slice of events.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Totals {
    pub(crate) count: usize,
    pub(crate) successes: usize,
    pub(crate) latency_ms: f64,
    pub(crate) tokens: u64,
}

#[allow(clippy::cast_precision_loss)]
impl Totals {
    pub(crate) fn over(events: &[EventRecord]) -> Self {
        events.iter().fold(Self::default(), |mut acc, event| {
            acc.add(event);
            acc
        })
    }

    fn add(&mut self, event: &EventRecord) {
        self.count += 1;
        if event.is_success() {
            self.successes += 1;
        }
        self.latency_ms += event.latency_ms();
        self.tokens = self.tokens.saturating_add(event.token_usage().total());
    }

    pub(crate) fn success_rate(self) -> f64 {
        self.successes as f64 / self.count as f64
    }

    pub(crate) fn mean_latency_ms(self) -> f64 {
        self.latency_ms / self.count as f64
    }

    pub(crate) fn mean_tokens(self) -> f64 {
        self.tokens as f64 / self.count as f64
    }
}

/// Computes statistics on demand from the store's current contents.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsAggregator;

impl StatsAggregator {
    /// Summarises every event currently in the store.
    ///
    /// Returns [`StatsSnapshot::NoData`] for an empty store.
    #[must_use]
    pub fn snapshot(store: &EventStore) -> StatsSnapshot {
        let totals = store.with_events(Totals::over);
        if totals.count == 0 {
            return StatsSnapshot::NoData {
                message: NO_DATA_MESSAGE,
            };
        }

        StatsSnapshot::Data(Stats {
            total_events: totals.count,
            success_rate: totals.success_rate(),
            avg_latency_ms: totals.mean_latency_ms(),
            session_id: store.session_id(),
            project_name: store.session().project_name().to_owned(),
        })
    }

    /// Summarises events per action type, ordered by label.
    #[must_use]
    pub fn by_action_type(store: &EventStore) -> Vec<ActionStats> {
        let grouped = store.with_events(|events| {
            let mut grouped: BTreeMap<String, Totals> = BTreeMap::new();
            for event in events {
                grouped
                    .entry(event.action_type().to_owned())
                    .or_default()
                    .add(event);
            }
            grouped
        });

        grouped
            .into_iter()
            .map(|(action_type, totals)| ActionStats {
                action_type,
                total_events: totals.count,
                success_rate: totals.success_rate(),
                avg_latency_ms: totals.mean_latency_ms(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentops_primitives::Session;

    fn event(action: &str, latency_ms: f64, success: bool) -> EventRecord {
        let builder = EventRecord::builder(action).latency_ms(latency_ms).unwrap();
        if success {
            builder.build()
        } else {
            builder.failure("failed").build()
        }
    }

    #[test]
    fn empty_store_returns_sentinel() {
        let store = EventStore::new(Session::start("demo"));
        let snapshot = StatsAggregator::snapshot(&store);
        assert!(snapshot.is_empty());
        assert_eq!(
            serde_json::to_value(&snapshot).unwrap(),
            serde_json::json!({ "message": "no data" })
        );
        assert!(StatsAggregator::by_action_type(&store).is_empty());
    }

    #[test]
    fn computes_rate_and_mean_over_all_events() {
        let store = EventStore::new(Session::start("demo"));
        store.append(event("a", 10.0, true));
        store.append(event("a", 20.0, true));
        store.append(event("b", 30.0, false));

        let snapshot = StatsAggregator::snapshot(&store);
        let stats = snapshot.stats().expect("stats present");
        assert_eq!(stats.total_events, 3);
        assert!((stats.success_rate - 2.0 / 3.0).abs() < 1e-9);
        assert!((stats.avg_latency_ms - 20.0).abs() < 1e-9);
        assert_eq!(stats.session_id, store.session_id());
        assert_eq!(stats.project_name, "demo");
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let store = EventStore::new(Session::start("demo"));
        store.append(event("a", 10.0, true));
        let value = serde_json::to_value(StatsAggregator::snapshot(&store)).unwrap();
        assert_eq!(value["totalEvents"], 1);
        assert_eq!(value["projectName"], "demo");
        assert_eq!(value["sessionId"], store.session_id().to_string());
    }

    #[test]
    fn groups_by_action_type() {
        let store = EventStore::new(Session::start("demo"));
        store.append(event("search", 10.0, true));
        store.append(event("analyze", 40.0, false));
        store.append(event("search", 30.0, false));

        let breakdown = StatsAggregator::by_action_type(&store);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].action_type, "analyze");
        assert_eq!(breakdown[0].total_events, 1);
        assert!(breakdown[0].success_rate.abs() < f64::EPSILON);
        assert_eq!(breakdown[1].action_type, "search");
        assert_eq!(breakdown[1].total_events, 2);
        assert!((breakdown[1].success_rate - 0.5).abs() < 1e-9);
        assert!((breakdown[1].avg_latency_ms - 20.0).abs() < 1e-9);
    }
}
