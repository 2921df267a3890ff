//! Strongly typed monitor configuration.

use std::fmt;

use agentops_primitives::DriftThreshold;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, ConfigResult};

/// Project label used when none is configured.
pub const DEFAULT_PROJECT_NAME: &str = "default";

/// How wrapped calls record their arguments in event metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentCapture {
    /// Record the `Debug` rendering of the arguments.
    #[default]
    Debug,
    /// Record a fixed placeholder instead of the arguments.
    Redacted,
    /// Do not record arguments at all.
    Disabled,
}

/// Settings applied when a monitor is initialised.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct MonitorConfig {
    api_key: Option<String>,
    project_name: String,
    drift_threshold: DriftThreshold,
    argument_capture: ArgumentCapture,
}

impl MonitorConfig {
    /// Creates a configuration for the named project with default settings.
    #[must_use]
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            ..Self::default()
        }
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the drift threshold fraction.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Primitive`] when the fraction is negative or not finite.
    pub fn with_drift_threshold(mut self, fraction: f64) -> ConfigResult<Self> {
        self.drift_threshold = DriftThreshold::new(fraction)?;
        Ok(self)
    }

    /// Sets the argument capture policy.
    #[must_use]
    pub fn with_argument_capture(mut self, capture: ArgumentCapture) -> Self {
        self.argument_capture = capture;
        self
    }

    /// Returns the API key, if configured.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Returns the project label.
    #[must_use]
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Returns the drift threshold.
    #[must_use]
    pub const fn drift_threshold(&self) -> DriftThreshold {
        self.drift_threshold
    }

    /// Returns the argument capture policy.
    #[must_use]
    pub const fn argument_capture(&self) -> ArgumentCapture {
        self.argument_capture
    }

    /// Checks that the configuration can be used to start a monitor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfig`] when the project name is blank or
    /// an API key is present but blank.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.project_name.trim().is_empty() {
            return Err(ConfigError::InvalidConfig("project name must not be empty"));
        }
        if self.api_key.as_deref().is_some_and(|key| key.trim().is_empty()) {
            return Err(ConfigError::InvalidConfig("api key must not be blank when set"));
        }
        Ok(())
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            project_name: DEFAULT_PROJECT_NAME.to_owned(),
            drift_threshold: DriftThreshold::default(),
            argument_capture: ArgumentCapture::default(),
        }
    }
}

impl fmt::Debug for MonitorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("project_name", &self.project_name)
            .field("drift_threshold", &self.drift_threshold)
            .field("argument_capture", &self.argument_capture)
            .finish()
    }
}
