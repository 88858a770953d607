use chrono::{Duration, NaiveDateTime};
use tracing::debug;

use super::BusinessCalendar;

/// Round fractional minutes to the nearest whole minute.
/// Exact halves round away from zero: 1.5 -> 2, 2.5 -> 3.
pub fn round_minutes(minutes: f64) -> u64 {
    // `as` saturates: NaN and negatives become 0
    minutes.round() as u64
}

/// Business hours as whole minutes
pub fn hours_to_minutes(hours: f64) -> u64 {
    round_minutes(hours * 60.0)
}

impl BusinessCalendar<'_> {
    /// Advance a normalized instant by a business-hour duration
    pub fn add_working_hours(&self, instant: NaiveDateTime, hours: f64) -> NaiveDateTime {
        self.add_working_minutes(instant, hours_to_minutes(hours))
    }

    /// Advance by whole working minutes, counting only time inside working segments.
    /// Running out of a morning resumes after lunch; running out of an afternoon
    /// resumes at opening on the next working day.
    pub fn add_working_minutes(&self, instant: NaiveDateTime, minutes: u64) -> NaiveDateTime {
        let schedule = self.schedule;
        let mut current = instant;
        let mut remaining = minutes;

        while remaining > 0 {
            if !self.is_working_day(current.date())
                || !schedule.is_within_working_hours(current.time())
            {
                current = self.snap_back(current);
            }

            let date = current.date();
            let morning = schedule.is_morning(current.time());
            let segment_end = if morning {
                schedule.lunch_start(date)
            } else {
                schedule.closing(date)
            };

            let available = u64::try_from((segment_end - current).num_minutes()).unwrap_or(0);
            if available >= remaining {
                current += Duration::minutes(remaining as i64);
                break;
            }

            remaining -= available;
            current = if morning {
                schedule.lunch_end(date)
            } else {
                schedule.opening(self.next_working_day(date))
            };
        }

        debug!("Added {} working minutes: {} -> {}", minutes, instant, current);
        current
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::holidays::HolidaySet;

    fn add_hours(holidays: &HolidaySet, instant: NaiveDateTime, hours: f64) -> NaiveDateTime {
        BusinessCalendar::new(business_zone(), holidays).add_working_hours(instant, hours)
    }

    // === rounding ===

    #[test]
    fn test_round_minutes_half_rounds_up() {
        assert_eq!(round_minutes(1.5), 2);
        assert_eq!(round_minutes(2.5), 3);
        assert_eq!(round_minutes(0.5), 1);
    }

    #[test]
    fn test_round_minutes_nearest() {
        assert_eq!(round_minutes(1.49), 1);
        assert_eq!(round_minutes(1.51), 2);
        assert_eq!(round_minutes(0.0), 0);
    }

    #[test]
    fn test_round_minutes_saturates() {
        assert_eq!(round_minutes(-3.0), 0);
        assert_eq!(round_minutes(f64::NAN), 0);
    }

    #[test]
    fn test_hours_to_minutes() {
        assert_eq!(hours_to_minutes(1.0), 60);
        assert_eq!(hours_to_minutes(0.5), 30);
        assert_eq!(hours_to_minutes(1.25), 75);
        assert_eq!(hours_to_minutes(0.001), 0);
    }

    // === advancing ===

    #[test]
    fn test_lunch_excluded() {
        let holidays = HolidaySet::new();
        assert_eq!(
            add_hours(&holidays, at(2024, 3, 5, 11, 30), 1.0),
            at(2024, 3, 5, 13, 30)
        );
    }

    #[test]
    fn test_friday_afternoon_rolls_to_monday() {
        let holidays = HolidaySet::new();
        assert_eq!(
            add_hours(&holidays, at(2023, 12, 1, 16, 30), 1.0),
            at(2023, 12, 4, 8, 30)
        );
    }

    #[test]
    fn test_holiday_monday_skipped() {
        let holidays = HolidaySet::from_dates([date(2023, 12, 4)]);
        assert_eq!(
            add_hours(&holidays, at(2023, 12, 1, 16, 30), 1.0),
            at(2023, 12, 5, 8, 30)
        );
    }

    #[test]
    fn test_full_day_ends_at_closing() {
        let holidays = HolidaySet::new();
        assert_eq!(
            add_hours(&holidays, at(2024, 3, 5, 8, 0), 8.0),
            at(2024, 3, 5, 17, 0)
        );
    }

    #[test]
    fn test_morning_ends_at_lunch_start() {
        let holidays = HolidaySet::new();
        assert_eq!(
            add_hours(&holidays, at(2024, 3, 5, 8, 0), 4.0),
            at(2024, 3, 5, 12, 0)
        );
    }

    #[test]
    fn test_from_lunch_start_resumes_after_lunch() {
        let holidays = HolidaySet::new();
        assert_eq!(
            add_hours(&holidays, at(2024, 3, 5, 12, 0), 0.5),
            at(2024, 3, 5, 13, 30)
        );
    }

    #[test]
    fn test_from_closing_rolls_to_next_morning() {
        let holidays = HolidaySet::new();
        assert_eq!(
            add_hours(&holidays, at(2024, 3, 5, 17, 0), 1.0 / 60.0),
            at(2024, 3, 6, 8, 1)
        );
    }

    #[test]
    fn test_multi_day_duration() {
        let holidays = HolidaySet::new();
        // Tuesday 15:00 + 20h: 2h Tue, 8h Wed, 8h Thu, 2h Fri
        assert_eq!(
            add_hours(&holidays, at(2024, 3, 5, 15, 0), 20.0),
            at(2024, 3, 8, 10, 0)
        );
    }

    #[test]
    fn test_fractional_hours() {
        let holidays = HolidaySet::new();
        assert_eq!(
            add_hours(&holidays, at(2024, 3, 5, 9, 0), 1.5),
            at(2024, 3, 5, 10, 30)
        );
    }

    #[test]
    fn test_sub_minute_duration_rounds_to_nothing() {
        let holidays = HolidaySet::new();
        assert_eq!(
            add_hours(&holidays, at(2024, 3, 5, 9, 0), 0.001),
            at(2024, 3, 5, 9, 0)
        );
    }

    #[test]
    fn test_off_schedule_start_renormalized() {
        let holidays = HolidaySet::new();
        // Saturday 10:00 -> Friday 17:00 -> Monday 09:00
        let calendar = BusinessCalendar::new(business_zone(), &holidays);
        assert_eq!(
            calendar.add_working_minutes(at(2023, 12, 2, 10, 0), 60),
            at(2023, 12, 4, 9, 0)
        );
    }
}
