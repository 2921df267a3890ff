//! Event recording for instrumented agent actions.
//!
//! [`EventRecord`] captures one call's outcome, [`EventStore`] keeps the
//! append-only sequence for a session, and [`Exporter`] implementations write
//! that sequence to an external sink.

#![warn(missing_docs, clippy::pedantic)]

pub mod error;
pub mod export;
pub mod record;
pub mod store;

pub use error::{EventError, EventResult};
pub use export::{Exporter, JsonFileExporter};
pub use record::{EventRecord, EventRecordBuilder, Outcome, UNDISPLAYABLE_ERROR, UNKNOWN_MODEL};
pub use store::EventStore;
