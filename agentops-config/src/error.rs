//! Error types for configuration handling.

use thiserror::Error;

/// Errors raised while building, loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field failed validation.
    #[error("invalid monitor configuration: {0}")]
    InvalidConfig(&'static str),
    /// The configuration file could not be read.
    #[error("i/o error: {source}")]
    Io {
        /// Source [`std::io::Error`].
        #[from]
        source: std::io::Error,
    },
    /// The configuration text was not valid JSON for the schema.
    #[error("parse error: {source}")]
    Parse {
        /// Source [`serde_json::Error`].
        #[from]
        source: serde_json::Error,
    },
    /// A primitive value was rejected.
    #[error(transparent)]
    Primitive(#[from] agentops_primitives::Error),
}

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
