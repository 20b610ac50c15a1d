//! Clock abstraction for window resolution and delay computation.

use chrono::{DateTime, Duration, Utc};

/// Source of "now".
///
/// Injected into the scheduler so window resolution and delay
/// computation can run against wall-clock time in production and
/// virtual time in tests.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to the tokio runtime's notion of elapsed time.
///
/// Reads `base` at creation and advances with `tokio::time::Instant`.
/// Under a paused runtime this moves in lockstep with the runtime's
/// timers, which makes scheduler behavior fully deterministic.
#[derive(Debug, Clone)]
pub struct SimulatedClock {
    base: DateTime<Utc>,
    origin: tokio::time::Instant,
}

impl SimulatedClock {
    /// A clock that reads `base` at the moment of creation.
    ///
    /// Must be called from within a tokio runtime.
    pub fn starting_at(base: DateTime<Utc>) -> Self {
        Self {
            base,
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Clock for SimulatedClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = self.origin.elapsed();
        self.base + Duration::microseconds(elapsed.as_micros() as i64)
    }
}
