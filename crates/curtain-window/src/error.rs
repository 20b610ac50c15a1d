//! Error types for window configuration.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur when resolving a window spec.
///
/// These are configuration errors: callers are expected to degrade to
/// "never shown" rather than fail, since a display-layer scheduling
/// mistake must not block rendering.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WindowError {
    /// Absolute window whose end is not after its start.
    #[error("window end {end} is not after start {start}")]
    EmptyWindow {
        /// Configured start instant.
        start: DateTime<Utc>,
        /// Configured end instant.
        end: DateTime<Utc>,
    },

    /// Daily window with an out-of-range hour or minute.
    #[error("invalid time of day {hour:02}:{minute:02}")]
    InvalidTimeOfDay {
        /// Offending hour component.
        hour: u32,
        /// Offending minute component.
        minute: u32,
    },
}
