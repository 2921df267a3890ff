//! Monitor runtime for instrumented agent actions.
//!
//! A [`MonitorHandle`] owns one session's event store and baseline comparator.
//! [`ActionWrapper`] instruments caller operations: it times them, records an
//! event once they complete, and hands back the original result untouched.
//! The [`global`] module offers an optional process-wide monitor with explicit
//! [`init`] and [`shutdown`].

#![warn(missing_docs, clippy::pedantic)]

mod error;
pub mod global;
mod monitor;
mod wrapper;

pub use error::{MonitorError, MonitorResult};
pub use global::{init, shutdown};
pub use monitor::MonitorHandle;
pub use wrapper::{
    ActionWrapper, DefaultUsage, Instrumented, REDACTED_ARGUMENTS, UNFORMATTABLE_ARGUMENTS,
    UsageExtractor,
};
