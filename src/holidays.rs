//! Holiday calendar retrieval and caching
//!
//! A `HolidayProvider` owns a `HolidaySource` and fetches from it at most once
//! successfully. Concurrent first callers share one in-flight fetch; a failed fetch
//! leaves the cache empty so the next caller retries.

use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use crate::error::{CalendarError, Result};

/// Only the calendar-date prefix (`YYYY-MM-DD`) of each entry is used
const DATE_PREFIX_LEN: usize = 10;

/// Immutable set of non-working calendar dates in the business zone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidaySet {
    dates: BTreeSet<NaiveDate>,
}

impl HolidaySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dates<I>(dates: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    /// Build from ISO-8601 strings such as `2025-01-01T00:00:00.000Z`.
    /// A single unusable entry rejects the whole payload.
    pub fn from_entries<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let dates = entries
            .into_iter()
            .map(|entry| parse_holiday_entry(entry.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_dates(dates))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Parse the calendar date at the start of a holiday entry
pub fn parse_holiday_entry(entry: &str) -> Result<NaiveDate> {
    let prefix = entry.get(..DATE_PREFIX_LEN).ok_or_else(|| {
        CalendarError::ServiceUnavailable(format!("holiday entry '{}' is too short", entry))
    })?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").map_err(|e| {
        CalendarError::ServiceUnavailable(format!("holiday entry '{}' is not a date: {}", entry, e))
    })
}

/// Where holiday data comes from
pub trait HolidaySource: Send + Sync {
    fn fetch(&self) -> impl Future<Output = Result<HolidaySet>> + Send;
}

/// Fixed list of entries, parsed on every fetch
#[derive(Debug, Clone, Default)]
pub struct StaticHolidaySource {
    entries: Vec<String>,
}

impl StaticHolidaySource {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }
}

impl HolidaySource for StaticHolidaySource {
    fn fetch(&self) -> impl Future<Output = Result<HolidaySet>> + Send {
        async move { HolidaySet::from_entries(&self.entries) }
    }
}

/// Holiday source backed by an HTTP endpoint returning a JSON array of date strings
pub struct HttpHolidaySource {
    client: reqwest::Client,
    url: String,
}

impl HttpHolidaySource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                CalendarError::ServiceUnavailable(format!("failed to build HTTP client: {}", e))
            })?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    #[cfg(test)]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl HolidaySource for HttpHolidaySource {
    fn fetch(&self) -> impl Future<Output = Result<HolidaySet>> + Send {
        async move {
            debug!("Requesting holidays from {}", self.url);

            let response = self
                .client
                .get(&self.url)
                .send()
                .await
                .map_err(|e| {
                    CalendarError::ServiceUnavailable(format!("holiday request failed: {}", e))
                })?
                .error_for_status()
                .map_err(|e| {
                    CalendarError::ServiceUnavailable(format!("holiday source error: {}", e))
                })?;

            let entries: Vec<String> = response.json().await.map_err(|e| {
                CalendarError::ServiceUnavailable(format!("malformed holiday payload: {}", e))
            })?;

            HolidaySet::from_entries(&entries)
        }
    }
}

/// Fetch-once cache in front of a `HolidaySource`
pub struct HolidayProvider<S> {
    source: S,
    cache: OnceCell<Arc<HolidaySet>>,
}

impl<S: HolidaySource> HolidayProvider<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: OnceCell::new(),
        }
    }

    /// Cached holidays, fetching them on first use
    pub async fn fetch(&self) -> Result<Arc<HolidaySet>> {
        if let Some(holidays) = self.cache.get() {
            debug!("Holiday cache hit ({} dates)", holidays.len());
            return Ok(Arc::clone(holidays));
        }

        let holidays = self
            .cache
            .get_or_try_init(|| async {
                info!("Loading holiday calendar...");
                match self.source.fetch().await {
                    Ok(set) => {
                        info!("Holiday calendar loaded: {} dates", set.len());
                        Ok(Arc::new(set))
                    }
                    Err(e) => {
                        error!("Failed to load holiday calendar: {}", e);
                        Err(e)
                    }
                }
            })
            .await?;

        Ok(Arc::clone(holidays))
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.initialized()
    }

    #[cfg(test)]
    pub fn source(&self) -> &S {
        &self.source
    }
}
