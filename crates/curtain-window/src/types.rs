//! Window specs and phase classification.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::WindowError;

/// A maintenance window definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WindowSpec {
    /// Exact calendar moments.
    Absolute {
        /// When the window opens.
        start: DateTime<Utc>,
        /// When the window closes. Must be after `start`.
        end: DateTime<Utc>,
    },
    /// Recurring time-of-day pair, resolved against "today" at
    /// evaluation time. An end at or before the start rolls into the
    /// following day, so the window may cross midnight.
    Daily {
        /// Opening hour (0-23).
        start_hour: u32,
        /// Opening minute (0-59).
        start_minute: u32,
        /// Closing hour (0-23).
        end_hour: u32,
        /// Closing minute (0-59).
        end_minute: u32,
    },
}

impl WindowSpec {
    /// Create an absolute window.
    pub fn absolute(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::Absolute { start, end }
    }

    /// Create a recurring daily window.
    pub fn daily(start_hour: u32, start_minute: u32, end_hour: u32, end_minute: u32) -> Self {
        Self::Daily {
            start_hour,
            start_minute,
            end_hour,
            end_minute,
        }
    }

    /// Resolve to a concrete start/end pair for `now`.
    ///
    /// Absolute windows resolve to themselves and fail if the end is
    /// not after the start. Daily windows are anchored to `now`'s
    /// date, with the end rolled forward a day when it would otherwise
    /// not be after the start.
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<ResolvedWindow, WindowError> {
        match *self {
            Self::Absolute { start, end } => {
                if end <= start {
                    return Err(WindowError::EmptyWindow { start, end });
                }
                Ok(ResolvedWindow { start, end })
            }
            Self::Daily {
                start_hour,
                start_minute,
                end_hour,
                end_minute,
            } => {
                let today = now.date_naive();
                let start = today
                    .and_hms_opt(start_hour, start_minute, 0)
                    .ok_or(WindowError::InvalidTimeOfDay {
                        hour: start_hour,
                        minute: start_minute,
                    })?
                    .and_utc();
                let mut end = today
                    .and_hms_opt(end_hour, end_minute, 0)
                    .ok_or(WindowError::InvalidTimeOfDay {
                        hour: end_hour,
                        minute: end_minute,
                    })?
                    .and_utc();
                // End at or before start: the window runs into tomorrow.
                if end <= start {
                    end += Duration::days(1);
                }
                Ok(ResolvedWindow { start, end })
            }
        }
    }
}

/// A window resolved to concrete instants. Invariant: `end > start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedWindow {
    /// When the window opens.
    pub start: DateTime<Utc>,
    /// When the window closes.
    pub end: DateTime<Utc>,
}

impl ResolvedWindow {
    /// Classify `now` relative to this window.
    ///
    /// The window is half-open: `start` is inside, `end` is not.
    pub fn phase(&self, now: DateTime<Utc>) -> Phase {
        if now < self.start {
            Phase::Before
        } else if now < self.end {
            Phase::Inside
        } else {
            Phase::After
        }
    }
}

/// Classification of a point in time relative to a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Now is before the window opens.
    Before,
    /// Now is within the window.
    Inside,
    /// The window has already closed.
    After,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use test_case::test_case;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 6, hour, minute, 0).unwrap()
    }

    #[test]
    fn absolute_resolves_to_itself() {
        let spec = WindowSpec::absolute(at(17, 3), at(18, 0));
        let window = spec.resolve(at(12, 0)).unwrap();

        assert_eq!(window.start, at(17, 3));
        assert_eq!(window.end, at(18, 0));
    }

    #[test]
    fn absolute_rejects_end_before_start() {
        let spec = WindowSpec::absolute(at(18, 0), at(17, 0));

        assert_eq!(
            spec.resolve(at(12, 0)),
            Err(WindowError::EmptyWindow {
                start: at(18, 0),
                end: at(17, 0),
            })
        );
    }

    #[test]
    fn absolute_rejects_zero_width() {
        let spec = WindowSpec::absolute(at(17, 0), at(17, 0));
        assert!(spec.resolve(at(12, 0)).is_err());
    }

    #[test]
    fn daily_resolves_against_todays_date() {
        let spec = WindowSpec::daily(17, 3, 17, 10);
        let window = spec.resolve(at(12, 0)).unwrap();

        assert_eq!(window.start, at(17, 3));
        assert_eq!(window.end, at(17, 10));
    }

    #[test]
    fn daily_end_before_start_rolls_to_next_day() {
        // 17:03 -> 17:00 spans into tomorrow.
        let spec = WindowSpec::daily(17, 3, 17, 0);
        let window = spec.resolve(at(12, 0)).unwrap();

        assert_eq!(window.start, at(17, 3));
        assert_eq!(
            window.end,
            Utc.with_ymd_and_hms(2026, 2, 7, 17, 0, 0).unwrap()
        );
        // 23:00 the same day falls inside the rolled window.
        assert_eq!(window.phase(at(23, 0)), Phase::Inside);
    }

    #[test]
    fn daily_equal_start_and_end_rolls_to_full_day() {
        let spec = WindowSpec::daily(9, 0, 9, 0);
        let window = spec.resolve(at(12, 0)).unwrap();

        assert_eq!(window.end - window.start, Duration::days(1));
    }

    #[test]
    fn daily_rejects_out_of_range_fields() {
        assert_eq!(
            WindowSpec::daily(24, 0, 17, 0).resolve(at(12, 0)),
            Err(WindowError::InvalidTimeOfDay { hour: 24, minute: 0 })
        );
        assert_eq!(
            WindowSpec::daily(9, 0, 9, 60).resolve(at(12, 0)),
            Err(WindowError::InvalidTimeOfDay { hour: 9, minute: 60 })
        );
    }

    #[test_case(16, 0, Phase::Before ; "before start")]
    #[test_case(17, 3, Phase::Inside ; "at start boundary")]
    #[test_case(17, 30, Phase::Inside ; "mid window")]
    #[test_case(18, 0, Phase::After ; "at end boundary")]
    #[test_case(19, 0, Phase::After ; "after end")]
    fn phase_classification(hour: u32, minute: u32, expected: Phase) {
        let window = ResolvedWindow {
            start: at(17, 3),
            end: at(18, 0),
        };
        assert_eq!(window.phase(at(hour, minute)), expected);
    }

    #[test]
    fn spec_serializes_with_type_tag() {
        let spec = WindowSpec::daily(17, 3, 17, 10);
        let json = serde_json::to_value(&spec).unwrap();

        assert_eq!(json["type"], "daily");
        assert_eq!(json["start_hour"], 17);
        assert_eq!(json["end_minute"], 10);
    }

    #[test]
    fn spec_roundtrips_through_json() {
        let spec = WindowSpec::absolute(at(17, 3), at(18, 0));
        let json = serde_json::to_string(&spec).unwrap();
        let decoded: WindowSpec = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded.resolve(at(12, 0)), spec.resolve(at(12, 0)));
    }

    proptest! {
        // A resolved daily window is always non-empty and at most a day wide.
        #[test]
        fn daily_window_is_nonempty_and_bounded(
            start_hour in 0u32..24,
            start_minute in 0u32..60,
            end_hour in 0u32..24,
            end_minute in 0u32..60,
        ) {
            let spec = WindowSpec::daily(start_hour, start_minute, end_hour, end_minute);
            let window = spec.resolve(at(12, 0)).unwrap();

            prop_assert!(window.end > window.start);
            prop_assert!(window.end - window.start <= Duration::days(1));
        }

        // Phase agrees with the interval ordering for any probe instant.
        #[test]
        fn phase_matches_interval_ordering(offset_minutes in -2880i64..2880) {
            let window = ResolvedWindow {
                start: at(17, 3),
                end: at(18, 0),
            };
            let now = window.start + Duration::minutes(offset_minutes);

            let expected = if now < window.start {
                Phase::Before
            } else if now < window.end {
                Phase::Inside
            } else {
                Phase::After
            };
            prop_assert_eq!(window.phase(now), expected);
        }

        // Absolute resolution never depends on the probe instant.
        #[test]
        fn absolute_resolution_ignores_now(offset_hours in -1000i64..1000) {
            let spec = WindowSpec::absolute(at(17, 3), at(18, 0));
            let now = at(12, 0) + Duration::hours(offset_hours);

            let window = spec.resolve(now).unwrap();
            prop_assert_eq!(window.start, at(17, 3));
            prop_assert_eq!(window.end, at(18, 0));
        }
    }
}
