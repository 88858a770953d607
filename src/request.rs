//! Query-string parsing for `/calculate-date`

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

use crate::error::{CalendarError, Result};

/// Largest accepted `days`; day stepping is linear in this value
pub const MAX_DAYS: u32 = 100_000;

/// Largest accepted `hours`
pub const MAX_HOURS: f64 = 1_000_000.0;

/// Accepted start years. The upper bound leaves room for `MAX_DAYS` and `MAX_HOURS`
/// well inside chrono's date range.
pub const MIN_START_YEAR: i32 = 1;
pub const MAX_START_YEAR: i32 = 9999;

/// Validated calculation parameters
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationRequest {
    /// Start instant; `None` means "now"
    pub start: Option<DateTime<Utc>>,
    pub days: u32,
    pub hours: f64,
}

/// Parse and validate `days`, `hours` and `date` from a raw query string
/// (without the leading `?`). Unknown keys are ignored; the last occurrence wins.
pub fn parse_query(query: &str) -> Result<CalculationRequest> {
    let mut days = None;
    let mut hours = None;
    let mut date = None;

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let value = urlencoding::decode(value)
            .map_err(|_| CalendarError::InvalidInput(format!("parameter '{}' is not valid UTF-8", key)))?
            .into_owned();
        match key {
            "days" => days = Some(value),
            "hours" => hours = Some(value),
            "date" => date = Some(value),
            _ => {}
        }
    }

    build_request(days.as_deref(), hours.as_deref(), date.as_deref())
}

/// Validate raw parameter values, shared by the HTTP shell and the CLI
pub fn build_request(
    days: Option<&str>,
    hours: Option<&str>,
    date: Option<&str>,
) -> Result<CalculationRequest> {
    if days.is_none() && hours.is_none() {
        return Err(CalendarError::InvalidInput(
            "parameters 'days' and/or 'hours' must be provided".to_string(),
        ));
    }

    let mut invalid = Vec::new();
    let parsed_days = match days {
        Some(raw) => parse_days(raw).map_err(|_| invalid.push("'days'")).ok(),
        None => Some(0),
    };
    let parsed_hours = match hours {
        Some(raw) => parse_hours(raw).map_err(|_| invalid.push("'hours'")).ok(),
        None => Some(0.0),
    };

    let (days, hours) = match (parsed_days, parsed_hours) {
        (Some(d), Some(h)) if invalid.is_empty() => (d, h),
        _ => {
            return Err(CalendarError::InvalidInput(format!(
                "parameters {} must be valid non-negative numbers",
                invalid.join(" and ")
            )))
        }
    };

    if days > MAX_DAYS {
        return Err(CalendarError::InvalidInput(format!(
            "parameter 'days' must not exceed {}",
            MAX_DAYS
        )));
    }
    if hours > MAX_HOURS {
        return Err(CalendarError::InvalidInput(format!(
            "parameter 'hours' must not exceed {}",
            MAX_HOURS
        )));
    }
    if days == 0 && hours <= 0.0 {
        return Err(CalendarError::InvalidInput(
            "parameters 'days' and/or 'hours' must be greater than zero".to_string(),
        ));
    }

    let start = date
        .map(|raw| {
            parse_start(raw).ok_or_else(|| {
                CalendarError::InvalidInput(
                    "parameter 'date' must be a valid ISO 8601 date".to_string(),
                )
            })
        })
        .transpose()?;

    if let Some(start) = start {
        if !is_supported_start(start) {
            return Err(CalendarError::InvalidInput(format!(
                "parameter 'date' must fall between years {} and {}",
                MIN_START_YEAR, MAX_START_YEAR
            )));
        }
    }

    Ok(CalculationRequest { start, days, hours })
}

/// Start instant inside the year range the calendar arithmetic supports
pub fn is_supported_start(start: DateTime<Utc>) -> bool {
    (MIN_START_YEAR..=MAX_START_YEAR).contains(&start.year())
}

/// Whole non-negative number of days. `"3.0"` is accepted, `"3.5"` is not.
fn parse_days(raw: &str) -> std::result::Result<u32, ()> {
    let raw = raw.trim();
    if let Ok(days) = raw.parse::<u32>() {
        return Ok(days);
    }
    let value: f64 = raw.parse().map_err(|_| ())?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX) {
        Ok(value as u32)
    } else {
        Err(())
    }
}

fn parse_hours(raw: &str) -> std::result::Result<f64, ()> {
    let value: f64 = raw.trim().parse().map_err(|_| ())?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(())
    }
}

/// RFC 3339 instant, or a zone-less date-time or bare date taken as UTC
pub fn parse_start(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
