//! Configuration management for the monitor.
//!
//! [`MonitorConfig`] is built in code or loaded from JSON and validated before
//! a monitor is initialised from it.

#![warn(missing_docs, clippy::pedantic)]

mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use schema::{ArgumentCapture, DEFAULT_PROJECT_NAME, MonitorConfig};
