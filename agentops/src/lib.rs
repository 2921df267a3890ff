//! In-process monitoring for agent actions.
//!
//! Depend on this crate to get the whole monitor. It bundles the internal
//! crates behind feature flags so downstream users can enable only the parts
//! they need; the `kernel` feature (on by default) pulls in everything.

#![warn(missing_docs, clippy::pedantic)]

/// Re-export shared primitives for convenience.
pub use agentops_primitives as primitives;

/// Event records, the event store and exporters (enabled by `events` feature).
#[cfg(feature = "events")]
pub use agentops_events as events;

/// Statistics and drift detection (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use agentops_telemetry as telemetry;

/// Configuration management (enabled by `config` feature).
#[cfg(feature = "config")]
pub use agentops_config as config;

/// Monitor runtime and action instrumentation (enabled by `kernel` feature).
#[cfg(feature = "kernel")]
pub use agentops_kernel as kernel;

/// Process-wide monitor entry points (enabled by `kernel` feature).
#[cfg(feature = "kernel")]
pub use agentops_kernel::global::{
    establish_baseline, export_events, get_stats, handle, init, is_initialized, record_action,
    shutdown,
};
