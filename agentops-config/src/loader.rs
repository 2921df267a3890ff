//! Configuration loader implementations.

use std::path::Path;

use tracing::debug;

use crate::{ConfigResult, MonitorConfig};

/// Parses and validates a configuration from JSON text.
///
/// Missing fields take their defaults.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`](crate::ConfigError::Parse) for malformed JSON,
/// unknown fields or an invalid threshold, and
/// [`ConfigError::InvalidConfig`](crate::ConfigError::InvalidConfig) when
/// validation fails.
pub fn from_json_str(text: &str) -> ConfigResult<MonitorConfig> {
    let config: MonitorConfig = serde_json::from_str(text)?;
    config.validate()?;
    Ok(config)
}

/// Reads, parses and validates a JSON configuration file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`](crate::ConfigError::Io) when the file cannot be
/// read, otherwise the same errors as [`from_json_str`].
pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<MonitorConfig> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let config = from_json_str(&text)?;
    debug!(path = %path.display(), project = config.project_name(), "monitor config loaded");
    Ok(config)
}
