//! Business calendar arithmetic
//!
//! All classification happens on the wall clock of a fixed business offset.
//! Instants cross the boundary as `DateTime<Utc>`; inside, they are `NaiveDateTime`
//! values in the business zone.

mod days;
mod hours;
mod normalize;

pub use hours::{hours_to_minutes, round_minutes};

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::holidays::HolidaySet;
use crate::schedule::{self, BusinessSchedule};

/// Schedule, zone and holidays needed to classify and move instants
#[derive(Debug, Clone, Copy)]
pub struct BusinessCalendar<'a> {
    zone: FixedOffset,
    schedule: BusinessSchedule,
    holidays: &'a HolidaySet,
}

impl<'a> BusinessCalendar<'a> {
    pub fn new(zone: FixedOffset, holidays: &'a HolidaySet) -> Self {
        Self {
            zone,
            schedule: BusinessSchedule::STANDARD,
            holidays,
        }
    }

    #[cfg(test)]
    pub fn with_schedule(mut self, schedule: BusinessSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn zone(&self) -> FixedOffset {
        self.zone
    }

    #[cfg(test)]
    pub fn schedule(&self) -> &BusinessSchedule {
        &self.schedule
    }

    /// Wall-clock time in the business zone
    pub fn to_local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.zone).naive_local()
    }

    /// Back to UTC from the business-zone wall clock
    pub fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        let utc = local - Duration::seconds(i64::from(self.zone.local_minus_utc()));
        Utc.from_utc_datetime(&utc)
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        schedule::is_working_day(date, self.holidays)
    }

    /// Valid resting point: working day, inside a working segment (segment ends included)
    pub fn is_working_instant(&self, instant: NaiveDateTime) -> bool {
        self.is_working_day(instant.date())
            && self.schedule.is_within_working_segment(instant.time())
    }

    /// First working day strictly after `date`
    pub fn next_working_day(&self, date: NaiveDate) -> NaiveDate {
        let mut next = next_day(date);
        while !self.is_working_day(next) {
            next = next_day(next);
        }
        next
    }
}

fn next_day(date: NaiveDate) -> NaiveDate {
    date + Duration::days(1)
}

fn previous_day(date: NaiveDate) -> NaiveDate {
    date - Duration::days(1)
}
