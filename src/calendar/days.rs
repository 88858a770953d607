use chrono::NaiveDateTime;
use tracing::debug;

use super::{previous_day, BusinessCalendar};
use crate::schedule::truncate_to_minute;

impl BusinessCalendar<'_> {
    /// Advance a normalized instant by `days` working days, keeping its time of day.
    ///
    /// The starting date never counts. Steps one calendar day at a time, so the
    /// cost grows with `days`.
    pub fn add_working_days(&self, instant: NaiveDateTime, days: u32) -> NaiveDateTime {
        let schedule = self.schedule;

        let mut date = instant.date();
        for _ in 0..days {
            date = self.next_working_day(date);
        }

        let candidate = truncate_to_minute(date.and_time(instant.time()));
        let time = candidate.time();

        let result = if schedule.is_lunch_break(time) {
            schedule.lunch_start(date)
        } else if schedule.is_after_closing(time) {
            schedule.closing(date)
        } else if schedule.is_before_opening(time) {
            self.snap_back(schedule.closing(previous_day(date)))
        } else {
            candidate
        };

        debug!("Added {} working days: {} -> {}", days, instant, result);
        result
    }
}
