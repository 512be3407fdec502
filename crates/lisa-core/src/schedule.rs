//! Cron schedule parsing and next-fire computation.
//!
//! Only standard 5-field expressions are accepted. Fire times are
//! evaluated in the timezone of the reference time passed in; the
//! daemon uses local time so that windows like `6-21` mean office hours.

use chrono::{DateTime, Local, TimeZone};
use croner::Cron;

use crate::error::ScheduleError;

/// A parsed, validated cron expression.
#[derive(Debug, Clone)]
pub struct CronSchedule {
    expression: String,
    cron: Cron,
}

impl CronSchedule {
    /// Parse a 5-field cron expression.
    pub fn parse(expression: &str) -> Result<Self, ScheduleError> {
        let trimmed = expression.trim();
        if trimmed.is_empty() {
            return Err(ScheduleError::Empty);
        }

        let found = trimmed.split_whitespace().count();
        if found != 5 {
            return Err(ScheduleError::FieldCount {
                expression: trimmed.to_string(),
                found,
            });
        }

        let cron = Cron::new(trimmed)
            .parse()
            .map_err(|e| ScheduleError::Malformed {
                expression: trimmed.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            expression: trimmed.to_string(),
            cron,
        })
    }

    /// The normalized expression text.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// First fire time strictly after `from`, or `None` if the expression
    /// can never match again.
    pub fn next_after<Tz: TimeZone>(&self, from: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        self.cron.find_next_occurrence(from, false).ok()
    }

    /// Next fire time after now, in local time.
    pub fn next_fire(&self) -> Option<DateTime<Local>> {
        self.next_after(&Local::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn parses_default_schedule() {
        let schedule = CronSchedule::parse("*/5 6-21 * * *").unwrap();
        assert_eq!(schedule.expression(), "*/5 6-21 * * *");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let schedule = CronSchedule::parse("  0 * * * *\n").unwrap();
        assert_eq!(schedule.expression(), "0 * * * *");
    }

    #[test]
    fn rejects_empty_expression() {
        assert_eq!(CronSchedule::parse("   ").unwrap_err(), ScheduleError::Empty);
    }

    #[test]
    fn rejects_seconds_field() {
        let err = CronSchedule::parse("0 */5 * * * *").unwrap_err();
        assert!(matches!(err, ScheduleError::FieldCount { found: 6, .. }));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let err = CronSchedule::parse("61 * * * *").unwrap_err();
        assert!(matches!(err, ScheduleError::Malformed { .. }));
    }

    #[test]
    fn rejects_garbage() {
        let err = CronSchedule::parse("every five minutes of day").unwrap_err();
        assert!(matches!(err, ScheduleError::Malformed { .. }));
    }

    #[test]
    fn next_fire_within_window() {
        let schedule = CronSchedule::parse("*/5 6-21 * * *").unwrap();
        let from = Utc.with_ymd_and_hms(2024, 3, 4, 6, 2, 0).unwrap();
        let next = schedule.next_after(&from).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 4, 6, 5, 0).unwrap());
    }

    #[test]
    fn next_fire_skips_to_next_morning() {
        let schedule = CronSchedule::parse("*/5 6-21 * * *").unwrap();
        let from = Utc.with_ymd_and_hms(2024, 3, 4, 21, 58, 0).unwrap();
        let next = schedule.next_after(&from).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 5, 6, 0, 0).unwrap());
    }

    #[test]
    fn next_fire_is_strictly_after_reference() {
        let schedule = CronSchedule::parse("* * * * *").unwrap();
        let from = Utc.with_ymd_and_hms(2024, 3, 4, 12, 30, 0).unwrap();
        let next = schedule.next_after(&from).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 4, 12, 31, 0).unwrap());
    }

    #[test]
    fn next_fire_is_within_a_minute() {
        let schedule = CronSchedule::parse("* * * * *").unwrap();
        let next = schedule.next_fire().unwrap();
        assert!(next - Local::now() <= chrono::TimeDelta::seconds(60));
    }
}
