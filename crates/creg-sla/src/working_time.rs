//! Working-Time Arithmetic
//!
//! Elapsed business time between two instants, clipped to the
//! 09:00-19:00 working window (09:00-18:00 on shortened days) and
//! skipping holidays from the production calendar.

use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::calendar::HolidayCalendar;

/// Start of the working day.
pub const DAY_START_HOUR: u32 = 9;
/// End of an ordinary working day.
pub const DAY_END_HOUR: u32 = 19;
/// End of a shortened working day.
pub const SHORT_DAY_END_HOUR: u32 = 18;

/// Business-hours duration calculator over a [`HolidayCalendar`].
#[derive(Clone)]
pub struct WorkingTime {
    calendar: Arc<HolidayCalendar>,
}

impl WorkingTime {
    pub fn new(calendar: Arc<HolidayCalendar>) -> Self {
        Self { calendar }
    }

    /// Like [`between`](Self::between), tolerating absent endpoints.
    ///
    /// Ticket lifecycle data has gaps; a missing endpoint degrades to a
    /// zero duration with a warning instead of failing the computation.
    pub fn between_opt(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Duration {
        match (start, end) {
            (Some(start), Some(end)) => self.between(start, end),
            _ => {
                warn!(
                    "working-time range missing an endpoint: start={:?} end={:?}",
                    start, end
                );
                Duration::zero()
            }
        }
    }

    /// Working time elapsed between `start` and `end`.
    ///
    /// Walks day by day: holidays contribute nothing, other days
    /// contribute the overlap of `[start, end]` with that day's working
    /// window. Arithmetic inside a window is exact; the result is never
    /// negative. An empty or inverted range degrades to zero with a
    /// warning.
    pub fn between(&self, start: NaiveDateTime, end: NaiveDateTime) -> Duration {
        if start >= end {
            warn!("working-time range empty or inverted: {} >= {}", start, end);
            return Duration::zero();
        }

        let mut total = Duration::zero();
        let mut current = start;

        while current < end {
            let day = current.date();
            let holidays = self.calendar.get(day.year());

            if holidays.is_holiday(day) {
                current = next_midnight(day);
                continue;
            }

            let end_hour = if holidays.is_shortened(day) {
                SHORT_DAY_END_HOUR
            } else {
                DAY_END_HOUR
            };
            let window_start = at_hour(day, DAY_START_HOUR);
            let window_end = at_hour(day, end_hour);

            if current < window_start {
                current = window_start;
                // the whole remaining range may predate the window
                if current >= end {
                    break;
                }
            }
            if current >= window_end {
                current = next_midnight(day);
                continue;
            }

            if end < window_end {
                total += end - current;
                break;
            }
            total += window_end - current;
            current = next_midnight(day);
        }

        total
    }
}

fn at_hour(day: NaiveDate, hour: u32) -> NaiveDateTime {
    day.and_hms_opt(hour, 0, 0).unwrap_or_else(|| day.and_time(Default::default()))
}

fn next_midnight(day: NaiveDate) -> NaiveDateTime {
    day.succ_opt()
        .unwrap_or(NaiveDate::MAX)
        .and_time(Default::default())
}
