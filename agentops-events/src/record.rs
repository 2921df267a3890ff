//! Event record type describing one instrumented call.

use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use agentops_primitives::{SessionId, TokenUsage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{EventError, EventResult};

/// Model label used when the integration does not report one.
pub const UNKNOWN_MODEL: &str = "unknown";

/// Error message recorded when an error's `Display` implementation fails.
pub const UNDISPLAYABLE_ERROR: &str = "<error display failed>";

/// Result of an instrumented call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The call returned normally.
    Success,
    /// The call failed with the supplied message.
    Failure(String),
}

impl Outcome {
    /// Derives the outcome from a call result, stringifying the error.
    ///
    /// A `Display` implementation that fails or panics yields
    /// [`UNDISPLAYABLE_ERROR`] instead of propagating.
    pub fn from_result<T, E: Display>(result: &Result<T, E>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(err) => Self::Failure(
                panic::catch_unwind(AssertUnwindSafe(|| err.to_string()))
                    .unwrap_or_else(|_| UNDISPLAYABLE_ERROR.to_owned()),
            ),
        }
    }

    /// Returns `true` for [`Outcome::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Immutable record of one instrumented call.
///
/// Every field is fixed at construction apart from the session id, which the
/// [`EventStore`](crate::EventStore) assigns when the record is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    timestamp: DateTime<Utc>,
    action_type: String,
    latency_ms: f64,
    token_usage: TokenUsage,
    model: String,
    success: bool,
    error_message: Option<String>,
    session_id: Option<SessionId>,
    metadata: Option<Map<String, Value>>,
}

impl EventRecord {
    /// Creates a builder for a record of the given action type.
    #[must_use]
    pub fn builder(action_type: impl Into<String>) -> EventRecordBuilder {
        EventRecordBuilder {
            timestamp: Utc::now(),
            action_type: action_type.into(),
            latency_ms: 0.0,
            token_usage: TokenUsage::default(),
            model: UNKNOWN_MODEL.to_owned(),
            outcome: Outcome::Success,
            metadata: None,
        }
    }

    /// Returns the time the call completed.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the caller supplied action label.
    #[must_use]
    pub fn action_type(&self) -> &str {
        &self.action_type
    }

    /// Returns the wall-clock duration in milliseconds.
    #[must_use]
    pub fn latency_ms(&self) -> f64 {
        self.latency_ms
    }

    /// Returns the token counters.
    #[must_use]
    pub fn token_usage(&self) -> &TokenUsage {
        &self.token_usage
    }

    /// Returns the model label.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns `true` when the call succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Returns the failure message; present only for failed calls.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Returns the owning session, once the record has been appended.
    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        self.session_id
    }

    /// Returns caller context captured for the call.
    #[must_use]
    pub fn metadata(&self) -> Option<&Map<String, Value>> {
        self.metadata.as_ref()
    }

    pub(crate) fn assign_session(&mut self, session_id: SessionId) {
        self.session_id = Some(session_id);
    }
}

/// Builder type used to assemble [`EventRecord`] instances.
#[derive(Debug)]
pub struct EventRecordBuilder {
    timestamp: DateTime<Utc>,
    action_type: String,
    latency_ms: f64,
    token_usage: TokenUsage,
    model: String,
    outcome: Outcome,
    metadata: Option<Map<String, Value>>,
}

impl EventRecordBuilder {
    /// Sets the completion timestamp.
    #[must_use]
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Sets the latency from a measured duration.
    #[must_use]
    pub fn latency(mut self, elapsed: Duration) -> Self {
        self.latency_ms = elapsed.as_secs_f64() * 1000.0;
        self
    }

    /// Sets the latency in milliseconds after validating it.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::InvalidRecord`] when the value is negative or not finite.
    pub fn latency_ms(mut self, latency_ms: f64) -> EventResult<Self> {
        if !latency_ms.is_finite() || latency_ms < 0.0 {
            return Err(EventError::InvalidRecord(
                "latency must be a finite, non-negative number of milliseconds",
            ));
        }
        self.latency_ms = latency_ms;
        Ok(self)
    }

    /// Replaces the token counters.
    #[must_use]
    pub fn token_usage(mut self, token_usage: TokenUsage) -> Self {
        self.token_usage = token_usage;
        self
    }

    /// Sets the model label.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the call outcome.
    #[must_use]
    pub fn outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = outcome;
        self
    }

    /// Marks the call as failed with the supplied message.
    #[must_use]
    pub fn failure(self, message: impl Into<String>) -> Self {
        self.outcome(Outcome::Failure(message.into()))
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata
            .get_or_insert_with(Map::new)
            .insert(key.into(), value);
        self
    }

    /// Adds a full metadata map, overwriting existing keys when duplicates occur.
    #[must_use]
    pub fn merge_metadata(mut self, map: Map<String, Value>) -> Self {
        self.metadata.get_or_insert_with(Map::new).extend(map);
        self
    }

    /// Finalises the builder and produces the record.
    #[must_use]
    pub fn build(self) -> EventRecord {
        let (success, error_message) = match self.outcome {
            Outcome::Success => (true, None),
            Outcome::Failure(message) => (false, Some(message)),
        };
        EventRecord {
            timestamp: self.timestamp,
            action_type: self.action_type,
            latency_ms: self.latency_ms,
            token_usage: self.token_usage,
            model: self.model,
            success,
            error_message,
            session_id: None,
            metadata: self.metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_unknown_backend() {
        let record = EventRecord::builder("search").build();
        assert_eq!(record.action_type(), "search");
        assert_eq!(record.model(), UNKNOWN_MODEL);
        assert_eq!(record.token_usage(), &TokenUsage::default());
        assert!(record.is_success());
        assert!(record.error_message().is_none());
        assert!(record.session_id().is_none());
        assert!(record.metadata().is_none());
    }

    #[test]
    fn failure_carries_message() {
        let record = EventRecord::builder("search").failure("boom").build();
        assert!(!record.is_success());
        assert_eq!(record.error_message(), Some("boom"));
    }

    #[test]
    fn outcome_from_result_stringifies_error() {
        let ok: Result<u8, String> = Ok(1);
        let err: Result<u8, String> = Err("bad input".into());
        assert_eq!(Outcome::from_result(&ok), Outcome::Success);
        assert_eq!(
            Outcome::from_result(&err),
            Outcome::Failure("bad input".into())
        );
    }

    #[test]
    fn failing_error_display_falls_back() {
        struct Broken;

        impl Display for Broken {
            fn fmt(&self, _f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                Err(std::fmt::Error)
            }
        }

        let err: Result<(), Broken> = Err(Broken);
        assert_eq!(
            Outcome::from_result(&err),
            Outcome::Failure(UNDISPLAYABLE_ERROR.into())
        );
    }

    #[test]
    fn rejects_invalid_latency() {
        for value in [-1.0, f64::NAN, f64::INFINITY] {
            let err = EventRecord::builder("search")
                .latency_ms(value)
                .expect_err("invalid latency should fail");
            assert!(matches!(err, EventError::InvalidRecord(_)));
        }
    }

    #[test]
    fn latency_from_duration_is_in_milliseconds() {
        let record = EventRecord::builder("search")
            .latency(Duration::from_micros(1_500))
            .build();
        assert!((record.latency_ms() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn serializes_with_camel_case_fields_and_nulls() {
        let record = EventRecord::builder("search")
            .latency_ms(12.5)
            .unwrap()
            .build();
        let value = serde_json::to_value(&record).unwrap();
        let object = value.as_object().unwrap();
        for key in [
            "timestamp",
            "actionType",
            "latencyMs",
            "tokenUsage",
            "model",
            "success",
            "errorMessage",
            "sessionId",
            "metadata",
        ] {
            assert!(object.contains_key(key), "missing field {key}");
        }
        assert_eq!(object["errorMessage"], Value::Null);
        assert_eq!(object["sessionId"], Value::Null);
        assert_eq!(object["metadata"], Value::Null);
    }

    #[test]
    fn metadata_entries_accumulate() {
        let mut extra = Map::new();
        extra.insert("user".into(), Value::from("ada"));
        let record = EventRecord::builder("search")
            .metadata("args", Value::from("(1, 2)"))
            .merge_metadata(extra)
            .build();
        let metadata = record.metadata().unwrap();
        assert_eq!(metadata["args"], "(1, 2)");
        assert_eq!(metadata["user"], "ada");
    }
}
