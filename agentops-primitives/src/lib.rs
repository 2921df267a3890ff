//! Core shared types for the agent monitoring runtime.

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod ids;
mod session;
mod threshold;
mod tokens;

/// Error type and result alias shared across the SDK.
pub use error::{Error, Result};
/// Unique identifier for a monitoring session.
pub use ids::SessionId;
/// Monitoring session descriptor.
pub use session::Session;
/// Relative deviation limit used by drift detection.
pub use threshold::DriftThreshold;
/// Named token counters attached to events.
pub use tokens::TokenUsage;
