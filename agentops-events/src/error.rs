//! Error types for the event subsystem.

use serde_json::Error as SerdeError;
use thiserror::Error;

/// Errors emitted by event components.
#[derive(Debug, Error)]
pub enum EventError {
    /// Event record fields failed validation.
    #[error("invalid event record: {0}")]
    InvalidRecord(&'static str),
    /// Underlying I/O failure while writing an export.
    #[error("i/o error: {source}")]
    Io {
        /// Source [`std::io::Error`].
        #[from]
        source: std::io::Error,
    },
    /// Serialization or deserialization error.
    #[error("serialization error: {source}")]
    Serialization {
        /// Source [`serde_json::Error`].
        #[from]
        source: SerdeError,
    },
}

/// Result type alias for event operations.
pub type EventResult<T> = Result<T, EventError>;
