//! Statistics and drift detection over recorded agent events.
//!
//! [`StatsAggregator`] derives summary figures from an
//! [`EventStore`](agentops_events::EventStore); [`BaselineComparator`] captures
//! a baseline from those figures and compares each new event against it,
//! notifying [`DriftObserver`]s when latency deviates beyond the threshold.

#![warn(missing_docs, clippy::pedantic)]

pub mod baseline;
pub mod drift;
pub mod stats;

pub use baseline::{BaselineComparator, BaselineSnapshot};
pub use drift::{CollectingDriftObserver, DriftObserver, DriftSignal, TracingDriftObserver};
pub use stats::{ActionStats, NO_DATA_MESSAGE, Stats, StatsAggregator, StatsSnapshot};
