//! Working-date calculation
//!
//! Joins the holiday provider to the calendar engine: normalize the start instant,
//! add whole working days, then add working hours. Days always go first.

use chrono::{DateTime, FixedOffset, Timelike, Utc};
use tracing::{debug, info};

use crate::calendar::BusinessCalendar;
use crate::error::{CalendarError, Result};
use crate::holidays::{HolidayProvider, HolidaySource};
use crate::request::{is_supported_start, CalculationRequest};

/// Compute the instant reached from `start` after `days` working days and then
/// `hours` working hours. Result is UTC with whole-second precision.
pub fn compute_next(
    calendar: &BusinessCalendar<'_>,
    start: DateTime<Utc>,
    days: i64,
    hours: f64,
) -> Result<DateTime<Utc>> {
    if days < 0 {
        return Err(CalendarError::ContractViolation(format!(
            "days must be non-negative, got {}",
            days
        )));
    }
    let days = u32::try_from(days).map_err(|_| {
        CalendarError::ContractViolation(format!("days out of range: {}", days))
    })?;
    if !hours.is_finite() || hours < 0.0 {
        return Err(CalendarError::ContractViolation(format!(
            "hours must be a non-negative number, got {}",
            hours
        )));
    }

    if !is_supported_start(start) {
        return Err(CalendarError::ContractViolation(format!(
            "start instant out of supported range: {}",
            start
        )));
    }

    let local = calendar.to_local(start);
    let mut current = calendar.snap_back(local);
    debug!("Start {} normalized to {} (business zone)", local, current);

    if days > 0 {
        current = calendar.add_working_days(current, days);
    }

    if hours > 0.0 {
        current = calendar.add_working_hours(current, hours);
    }

    debug_assert!(calendar.is_working_instant(current), "{} is not a working instant", current);
    let result = calendar.to_utc(current);
    Ok(result.with_nanosecond(0).unwrap_or(result))
}

/// Calculation service with its own holiday cache
pub struct WorkingDateService<S> {
    provider: HolidayProvider<S>,
    zone: FixedOffset,
}

impl<S: HolidaySource> WorkingDateService<S> {
    pub fn new(provider: HolidayProvider<S>, zone: FixedOffset) -> Self {
        Self { provider, zone }
    }

    pub fn provider(&self) -> &HolidayProvider<S> {
        &self.provider
    }

    #[cfg(test)]
    pub fn zone(&self) -> FixedOffset {
        self.zone
    }

    /// Run one calculation. A holiday failure aborts the whole calculation.
    pub async fn calculate(&self, request: &CalculationRequest) -> Result<DateTime<Utc>> {
        let holidays = self.provider.fetch().await?;
        let calendar = BusinessCalendar::new(self.zone, &holidays);
        let start = request.start.unwrap_or_else(Utc::now);

        let result = compute_next(&calendar, start, i64::from(request.days), request.hours)?;
        info!(
            "Calculated {} + {} days + {} hours -> {}",
            start.to_rfc3339(),
            request.days,
            request.hours,
            result.to_rfc3339()
        );
        Ok(result)
    }
}
