use chrono::NaiveDateTime;
use tracing::debug;

use super::{previous_day, BusinessCalendar};
use crate::schedule::truncate_to_minute;

impl BusinessCalendar<'_> {
    /// Move an instant backward to the nearest valid working instant.
    ///
    /// - non-working day: previous day at closing, repeat
    /// - at or after closing: closing time, same day
    /// - during lunch: start of lunch
    /// - before opening: previous day at closing, repeat
    /// - otherwise: same instant without seconds
    ///
    /// Never moves forward, and is idempotent on instants it returns.
    pub fn snap_back(&self, instant: NaiveDateTime) -> NaiveDateTime {
        let schedule = self.schedule;
        let mut current = instant;

        loop {
            let date = current.date();
            let time = current.time();

            if !self.is_working_day(date) {
                current = schedule.closing(previous_day(date));
                continue;
            }

            if schedule.is_after_closing(time) {
                return schedule.closing(date);
            }

            if schedule.is_lunch_break(time) {
                return schedule.lunch_start(date);
            }

            if schedule.is_before_opening(time) {
                current = schedule.closing(previous_day(date));
                continue;
            }

            let normalized = truncate_to_minute(current);
            if normalized != instant {
                debug!("Snapped {} back to {}", instant, normalized);
            }
            return normalized;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::holidays::HolidaySet;

    fn snap(holidays: &HolidaySet, instant: NaiveDateTime) -> NaiveDateTime {
        BusinessCalendar::new(business_zone(), holidays).snap_back(instant)
    }

    #[test]
    fn test_valid_instant_unchanged() {
        let holidays = HolidaySet::new();
        assert_eq!(snap(&holidays, at(2024, 3, 5, 10, 15)), at(2024, 3, 5, 10, 15));
        assert_eq!(snap(&holidays, at(2024, 3, 5, 8, 0)), at(2024, 3, 5, 8, 0));
        assert_eq!(snap(&holidays, at(2024, 3, 5, 13, 0)), at(2024, 3, 5, 13, 0));
    }

    #[test]
    fn test_seconds_truncated() {
        let holidays = HolidaySet::new();
        let instant = date(2024, 3, 5).and_hms_milli_opt(10, 15, 59, 999).unwrap();
        assert_eq!(snap(&holidays, instant), at(2024, 3, 5, 10, 15));
    }

    #[test]
    fn test_closing_time_is_fixed_point() {
        let holidays = HolidaySet::new();
        assert_eq!(snap(&holidays, at(2024, 3, 5, 17, 0)), at(2024, 3, 5, 17, 0));
    }

    #[test]
    fn test_after_closing_clamps_same_day() {
        let holidays = HolidaySet::new();
        assert_eq!(snap(&holidays, at(2024, 3, 5, 17, 1)), at(2024, 3, 5, 17, 0));
        assert_eq!(snap(&holidays, at(2024, 3, 5, 23, 59)), at(2024, 3, 5, 17, 0));
    }

    #[test]
    fn test_lunch_clamps_to_lunch_start() {
        let holidays = HolidaySet::new();
        assert_eq!(snap(&holidays, at(2024, 3, 5, 12, 0)), at(2024, 3, 5, 12, 0));
        assert_eq!(snap(&holidays, at(2024, 3, 5, 12, 30)), at(2024, 3, 5, 12, 0));
        assert_eq!(snap(&holidays, at(2024, 3, 5, 12, 59)), at(2024, 3, 5, 12, 0));
    }

    #[test]
    fn test_before_opening_rolls_to_previous_close() {
        let holidays = HolidaySet::new();
        // Tuesday 07:59 -> Monday 17:00
        assert_eq!(snap(&holidays, at(2024, 3, 5, 7, 59)), at(2024, 3, 4, 17, 0));
        assert_eq!(snap(&holidays, at(2024, 3, 5, 0, 0)), at(2024, 3, 4, 17, 0));
    }

    #[test]
    fn test_monday_morning_rolls_to_friday() {
        let holidays = HolidaySet::new();
        assert_eq!(snap(&holidays, at(2024, 3, 4, 6, 0)), at(2024, 3, 1, 17, 0));
    }

    #[test]
    fn test_weekend_rolls_to_friday_close() {
        let holidays = HolidaySet::new();
        // Saturday 14:00 and Sunday 18:00 -> Friday 17:00
        assert_eq!(snap(&holidays, at(2023, 12, 2, 14, 0)), at(2023, 12, 1, 17, 0));
        assert_eq!(snap(&holidays, at(2023, 12, 3, 18, 0)), at(2023, 12, 1, 17, 0));
    }

    #[test]
    fn test_holiday_chain_skipped() {
        // Thursday and Friday before Easter 2025
        let holidays = HolidaySet::from_dates([date(2025, 4, 17), date(2025, 4, 18)]);
        // Saturday 2025-04-19 -> Wednesday 2025-04-16 17:00
        assert_eq!(snap(&holidays, at(2025, 4, 19, 10, 0)), at(2025, 4, 16, 17, 0));
    }

    #[test]
    fn test_monday_holiday_before_opening() {
        let holidays = HolidaySet::from_dates([date(2025, 1, 6)]);
        // Tuesday 07:00 -> Monday is a holiday -> Friday 17:00
        assert_eq!(snap(&holidays, at(2025, 1, 7, 7, 0)), at(2025, 1, 3, 17, 0));
    }
}
