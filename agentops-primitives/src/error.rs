//! Shared error definitions for monitoring primitives.

use thiserror::Error;
use uuid::Error as UuidError;

/// Result alias used throughout the monitoring runtime.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while manipulating primitive types.
#[derive(Debug, Error)]
pub enum Error {
    /// The provided session identifier could not be parsed.
    #[error("invalid session id: {source}")]
    InvalidSessionId {
        /// Source parsing error from the UUID library.
        #[from]
        source: UuidError,
    },

    /// Drift threshold failed validation.
    #[error("invalid drift threshold `{value}`: {reason}")]
    InvalidDriftThreshold {
        /// The offending value.
        value: f64,
        /// Human-readable reason for rejection.
        reason: &'static str,
    },
}
