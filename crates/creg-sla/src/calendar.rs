//! Production Calendar
//!
//! Holidays and shortened working days, cached per year.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

/// Calendar feed errors
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Request(String),
    #[error("feed payload malformed: {0}")]
    Malformed(String),
    #[error("no calendar data for year {0}")]
    NotFound(i32),
}

/// One year of the external calendar feed.
///
/// Day lists are comma-separated day numbers; a trailing `*` marks a
/// shortened working day, a trailing `+` marks a moved holiday. Both
/// markers are stripped before parsing the day number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarYear {
    pub year: i32,
    pub months: Vec<CalendarMonth>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarMonth {
    pub month: u32,
    pub days: String,
}

/// Non-working and shortened days of one calendar year.
#[derive(Debug, Clone, Default)]
pub struct HolidaySet {
    holidays: HashSet<NaiveDate>,
    shortened: HashSet<NaiveDate>,
}

impl HolidaySet {
    pub fn is_holiday(&self, day: NaiveDate) -> bool {
        self.holidays.contains(&day)
    }

    pub fn is_shortened(&self, day: NaiveDate) -> bool {
        self.shortened.contains(&day)
    }

    pub fn is_empty(&self) -> bool {
        self.holidays.is_empty() && self.shortened.is_empty()
    }

    /// Builds the day sets from one year of feed data.
    ///
    /// Shortened days go only into `shortened`: they stay working days,
    /// with a reduced window. Unparseable day tokens are skipped with a
    /// warning.
    fn from_feed(data: &CalendarYear) -> Self {
        let mut set = HolidaySet::default();
        for month in &data.months {
            for token in month.days.split(',') {
                let token = token.trim();
                if token.is_empty() {
                    continue;
                }
                let shortened = token.ends_with('*');
                let number = token.trim_end_matches(['*', '+']);
                let day = match number.parse::<u32>() {
                    Ok(day) => day,
                    Err(_) => {
                        warn!("skipping bad day token {:?} in month {}", token, month.month);
                        continue;
                    }
                };
                let date = match NaiveDate::from_ymd_opt(data.year, month.month, day) {
                    Some(date) => date,
                    None => {
                        warn!(
                            "skipping out-of-range date {}-{}-{} in calendar feed",
                            data.year, month.month, day
                        );
                        continue;
                    }
                };
                if shortened {
                    set.shortened.insert(date);
                } else {
                    set.holidays.insert(date);
                }
            }
        }
        set
    }
}

/// Source of per-year calendar data.
pub trait CalendarFeed: Send + Sync {
    fn fetch_year(&self, year: i32) -> Result<CalendarYear, FeedError>;
}

/// In-memory feed over pre-fetched years.
///
/// Used for pre-warmed bulk runs and in tests. Years not present report
/// [`FeedError::NotFound`], which the calendar degrades to an empty set.
#[derive(Debug, Default)]
pub struct StaticCalendarFeed {
    years: HashMap<i32, CalendarYear>,
}

impl StaticCalendarFeed {
    pub fn new(years: impl IntoIterator<Item = CalendarYear>) -> Self {
        Self {
            years: years.into_iter().map(|y| (y.year, y)).collect(),
        }
    }
}

impl CalendarFeed for StaticCalendarFeed {
    fn fetch_year(&self, year: i32) -> Result<CalendarYear, FeedError> {
        self.years.get(&year).cloned().ok_or(FeedError::NotFound(year))
    }
}

/// Per-year holiday cache over a [`CalendarFeed`].
///
/// The cache grows monotonically and is never evicted; at most one entry
/// per calendar year over the process lifetime. Concurrent readers are
/// safe; two workers racing on the same uncached year do idempotent
/// duplicate work.
pub struct HolidayCalendar {
    feed: Box<dyn CalendarFeed>,
    cache: DashMap<i32, Arc<HolidaySet>>,
}

impl HolidayCalendar {
    pub fn new(feed: impl CalendarFeed + 'static) -> Self {
        Self {
            feed: Box::new(feed),
            cache: DashMap::new(),
        }
    }

    /// Returns the holiday set for `year`, fetching on first use.
    ///
    /// A feed failure is logged and degrades to an empty set: every day
    /// is then treated as an ordinary working day rather than halting
    /// ticket processing. The degraded set is not cached, so the next
    /// lookup retries the feed and accuracy recovers.
    pub fn get(&self, year: i32) -> Arc<HolidaySet> {
        if let Some(cached) = self.cache.get(&year) {
            return cached.clone();
        }
        match self.feed.fetch_year(year) {
            Ok(data) => {
                let set = Arc::new(HolidaySet::from_feed(&data));
                self.cache.insert(year, set.clone());
                set
            }
            Err(err) => {
                error!(
                    "holiday feed unavailable for {}: {}; treating all days as working days",
                    year, err
                );
                Arc::new(HolidaySet::default())
            }
        }
    }

    /// Pre-warms the cache with already-fetched data, bypassing the feed.
    pub fn insert_year(&self, data: &CalendarYear) {
        self.cache.insert(data.year, Arc::new(HolidaySet::from_feed(data)));
    }

    pub fn cached_years(&self) -> usize {
        self.cache.len()
    }
}
