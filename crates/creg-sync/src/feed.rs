//! HTTP Holiday Feed
//!
//! [`CalendarFeed`] implementation over the public production-calendar
//! service (`{base}/{year}/calendar.json`).

use std::time::Duration;

use creg_sla::{CalendarFeed, CalendarYear, FeedError};

/// Default calendar service.
pub const DEFAULT_FEED_URL: &str = "https://xmlcalendar.ru/data/ru";

const FEED_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking HTTP client for the calendar feed.
///
/// The fetch blocks; bulk callers should pre-warm the calendar for the
/// years they need before entering the per-ticket loop.
pub struct HttpCalendarFeed {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpCalendarFeed {
    pub fn new(base_url: impl Into<String>) -> Self {
        // builder cannot fail with only a timeout configured
        let client = reqwest::blocking::Client::builder()
            .timeout(FEED_TIMEOUT)
            .build()
            .expect("calendar feed client");
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

impl Default for HttpCalendarFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_URL)
    }
}

impl CalendarFeed for HttpCalendarFeed {
    fn fetch_year(&self, year: i32) -> Result<CalendarYear, FeedError> {
        let url = format!("{}/{}/calendar.json", self.base_url, year);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| FeedError::Request(err.to_string()))?;
        if !response.status().is_success() {
            return Err(FeedError::Request(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }
        let mut data: CalendarYear = response
            .json()
            .map_err(|err| FeedError::Malformed(err.to_string()))?;
        // Trust the requested year over whatever the payload claims.
        data.year = year;
        Ok(data)
    }
}
