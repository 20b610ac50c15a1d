//! Maintenance window model for Curtain.
//!
//! A window is the contiguous time interval during which a UI element
//! should be visible. This crate is the pure half of the system:
//! window specs, resolution against a point in time, and phase
//! classification. Timers and runtime concerns live in
//! `curtain-scheduler`.

mod error;
mod types;

pub use error::WindowError;
pub use types::{Phase, ResolvedWindow, WindowSpec};
