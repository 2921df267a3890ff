//! Errors surfaced by the monitor runtime.

use agentops_config::ConfigError;
use agentops_events::EventError;
use thiserror::Error;

/// Errors produced by monitor operations.
///
/// Failures of wrapped operations are never converted into this type; they are
/// returned to the caller unchanged.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// A process-wide operation ran before [`init`](crate::init).
    #[error("monitor not initialized; call init() first")]
    Uninitialized,
    /// The supplied configuration was rejected.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Exporting events failed; recorded events are unaffected.
    #[error("export failed: {0}")]
    Export(#[from] EventError),
}

/// Result alias for monitor operations.
pub type MonitorResult<T> = Result<T, MonitorError>;
