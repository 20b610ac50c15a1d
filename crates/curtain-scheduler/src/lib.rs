//! Window-driven visibility scheduling for Curtain.
//!
//! One `WindowScheduler` per mounted element. Construction classifies
//! "now" against the element's maintenance window, arms at most one
//! show timer and one hide timer (plus an optional auto-hide timer),
//! and publishes visibility over a watch channel. All pending timers
//! are cancelled on dismissal and teardown, so a released scheduler
//! never fires a stale callback.

mod clock;
mod scheduler;

pub use clock::{Clock, SimulatedClock, SystemClock};
pub use scheduler::{OverridePredicate, SchedulerOptions, WindowScheduler};
