/// Business schedule classification
/// Weekdays 8am-5pm in the business zone, closed for lunch 12pm-1pm

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};

use crate::holidays::HolidaySet;

pub const WORK_START_HOUR: u32 = 8; // 8 AM
pub const LUNCH_START_HOUR: u32 = 12; // 12 PM
pub const LUNCH_END_HOUR: u32 = 13; // 1 PM
pub const WORK_END_HOUR: u32 = 17; // 5 PM (17:00)

/// Daily opening, lunch closure and closing, as whole hours of the business-zone day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessSchedule {
    pub start_hour: u32,
    pub lunch_start_hour: u32,
    pub lunch_end_hour: u32,
    pub end_hour: u32,
}

impl Default for BusinessSchedule {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl BusinessSchedule {
    pub const STANDARD: Self = Self {
        start_hour: WORK_START_HOUR,
        lunch_start_hour: LUNCH_START_HOUR,
        lunch_end_hour: LUNCH_END_HOUR,
        end_hour: WORK_END_HOUR,
    };

    /// `start < lunch_start < lunch_end < end`, all within one day
    #[cfg(any(test, kani))]
    pub fn is_ordered(&self) -> bool {
        self.start_hour < self.lunch_start_hour
            && self.lunch_start_hour < self.lunch_end_hour
            && self.lunch_end_hour < self.end_hour
            && self.end_hour <= 24
    }

    pub fn opening(&self, date: NaiveDate) -> NaiveDateTime {
        at_hour(date, self.start_hour)
    }

    pub fn lunch_start(&self, date: NaiveDate) -> NaiveDateTime {
        at_hour(date, self.lunch_start_hour)
    }

    pub fn lunch_end(&self, date: NaiveDate) -> NaiveDateTime {
        at_hour(date, self.lunch_end_hour)
    }

    pub fn closing(&self, date: NaiveDate) -> NaiveDateTime {
        at_hour(date, self.end_hour)
    }

    /// Open for business: `[start, lunch_start)` or `[lunch_end, end)`
    pub fn is_within_working_hours(&self, time: NaiveTime) -> bool {
        let minutes = minute_of_day(time);
        (minutes >= self.start_hour * 60 && minutes < self.lunch_start_hour * 60)
            || (minutes >= self.lunch_end_hour * 60 && minutes < self.end_hour * 60)
    }

    /// Closed form of the working segments. Segment ends (lunch start, closing) are
    /// valid resting points for the normalizer and the advancers.
    pub fn is_within_working_segment(&self, time: NaiveTime) -> bool {
        self.is_within_working_hours(time)
            || time == NaiveTime::MIN + Duration::hours(i64::from(self.lunch_start_hour))
            || time == NaiveTime::MIN + Duration::hours(i64::from(self.end_hour))
    }

    pub fn is_before_opening(&self, time: NaiveTime) -> bool {
        time.hour() < self.start_hour
    }

    pub fn is_lunch_break(&self, time: NaiveTime) -> bool {
        time.hour() >= self.lunch_start_hour && time.hour() < self.lunch_end_hour
    }

    pub fn is_after_closing(&self, time: NaiveTime) -> bool {
        time.hour() >= self.end_hour
    }

    /// Morning segment, including the instant lunch starts
    pub fn is_morning(&self, time: NaiveTime) -> bool {
        minute_of_day(time) <= self.lunch_start_hour * 60
    }
}

/// Minutes elapsed since midnight
pub fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Testable version of the working-hours check on raw clock fields
#[cfg(any(test, kani))]
pub fn is_working_hours_at(hour: u32, minute: u32) -> bool {
    let minutes = hour * 60 + minute;
    (minutes >= WORK_START_HOUR * 60 && minutes < LUNCH_START_HOUR * 60)
        || (minutes >= LUNCH_END_HOUR * 60 && minutes < WORK_END_HOUR * 60)
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn is_holiday(date: NaiveDate, holidays: &HolidaySet) -> bool {
    holidays.contains(date)
}

pub fn is_working_day(date: NaiveDate, holidays: &HolidaySet) -> bool {
    !is_weekend(date) && !is_holiday(date, holidays)
}

/// Drop seconds and sub-second precision
pub fn truncate_to_minute(instant: NaiveDateTime) -> NaiveDateTime {
    instant
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(instant)
}

fn at_hour(date: NaiveDate, hour: u32) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::hours(i64::from(hour))
}



/// Kani formal verification proofs
#[cfg(kani)]
mod kani_proofs {
    use super::*;

    #[kani::proof]
    fn working_hours_valid_range() {
        let hour: u32 = kani::any();
        kani::assume(hour < 24);
        let minute: u32 = kani::any();
        kani::assume(minute < 60);

        let result = is_working_hours_at(hour, minute);

        let expected = (hour >= WORK_START_HOUR && hour < LUNCH_START_HOUR)
            || (hour >= LUNCH_END_HOUR && hour < WORK_END_HOUR);
        kani::assert(result == expected, "working hours check must be consistent");
    }

    #[kani::proof]
    fn standard_schedule_ordered() {
        kani::assert(
            BusinessSchedule::STANDARD.is_ordered(),
            "standard schedule must be ordered",
        );
    }
}
