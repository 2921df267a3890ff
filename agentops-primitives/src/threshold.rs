//! Drift threshold value type.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Relative deviation fraction above which an event counts as drift.
///
/// `0.20` means an event whose latency differs from the baseline mean by more
/// than 20% is flagged.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct DriftThreshold(f64);

impl DriftThreshold {
    /// Threshold applied when none is configured.
    pub const DEFAULT: Self = Self(0.20);

    /// Creates a threshold after validating the fraction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDriftThreshold`] when the value is negative,
    /// NaN or infinite.
    pub fn new(fraction: f64) -> Result<Self> {
        if !fraction.is_finite() {
            return Err(Error::InvalidDriftThreshold {
                value: fraction,
                reason: "threshold must be a finite number",
            });
        }
        if fraction < 0.0 {
            return Err(Error::InvalidDriftThreshold {
                value: fraction,
                reason: "threshold must not be negative",
            });
        }
        Ok(Self(fraction))
    }

    /// Returns the raw fraction.
    #[must_use]
    pub const fn fraction(self) -> f64 {
        self.0
    }

    /// Returns `true` when `deviation` strictly exceeds the threshold.
    #[must_use]
    pub fn is_exceeded_by(self, deviation: f64) -> bool {
        deviation > self.0
    }
}

impl Default for DriftThreshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Display for DriftThreshold {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.0 * 100.0)
    }
}

impl TryFrom<f64> for DriftThreshold {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<DriftThreshold> for f64 {
    fn from(value: DriftThreshold) -> Self {
        value.0
    }
}
