//! Append-only, session-scoped event store.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use agentops_primitives::{Session, SessionId};
use tracing::debug;

use crate::record::EventRecord;

/// Ordered sequence of [`EventRecord`]s belonging to a single session.
///
/// Appends are serialised by a write lock held only for the push itself, so
/// the order of `append` calls is the authoritative event order. Readers get
/// point-in-time copies and never observe a partially written record.
#[derive(Debug)]
pub struct EventStore {
    session: Session,
    events: RwLock<Vec<EventRecord>>,
}

impl EventStore {
    /// Creates an empty store for the supplied session.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            session,
            events: RwLock::new(Vec::new()),
        }
    }

    /// Returns the owning session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the owning session identifier.
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session.id()
    }

    /// Stamps the record with the session id, appends it and returns the stored copy.
    pub fn append(&self, mut record: EventRecord) -> EventRecord {
        record.assign_session(self.session.id());
        let position = {
            let mut guard = self.write();
            guard.push(record.clone());
            guard.len() - 1
        };
        debug!(
            session_id = %self.session.id(),
            action_type = record.action_type(),
            latency_ms = record.latency_ms(),
            success = record.is_success(),
            position,
            "event recorded"
        );
        record
    }

    /// Returns a snapshot of every recorded event in append order.
    #[must_use]
    pub fn all(&self) -> Vec<EventRecord> {
        self.read().clone()
    }

    /// Runs `f` over a consistent, read-only view of the recorded events.
    pub fn with_events<R>(&self, f: impl FnOnce(&[EventRecord]) -> R) -> R {
        f(&self.read())
    }

    /// Returns the number of recorded events.
    #[must_use]
    pub fn count(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` when nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A panic can never leave the vector half-pushed, so a poisoned lock still
    // guards a consistent sequence.
    fn read(&self) -> RwLockReadGuard<'_, Vec<EventRecord>> {
        self.events.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<EventRecord>> {
        self.events.write().unwrap_or_else(PoisonError::into_inner)
    }
}
