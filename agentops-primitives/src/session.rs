//! Monitoring session descriptor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::SessionId;

/// One monitoring lifetime: every recorded event belongs to exactly one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    id: SessionId,
    project_name: String,
    started_at: DateTime<Utc>,
}

impl Session {
    /// Starts a new session for the supplied project.
    #[must_use]
    pub fn start(project_name: impl Into<String>) -> Self {
        Self {
            id: SessionId::generate(),
            project_name: project_name.into(),
            started_at: Utc::now(),
        }
    }

    /// Returns the session identifier.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the project label.
    #[must_use]
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Returns the time the session was started.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}
