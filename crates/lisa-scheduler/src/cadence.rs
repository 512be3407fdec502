//! When does a service fire next?

use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta};

use lisa_core::CronSchedule;

/// Source of fire times for one service's timer.
pub trait Cadence: Send + Sync + 'static {
    /// First fire time strictly after `after`, or `None` when the cadence
    /// has no further occurrences.
    fn next_fire_after(&self, after: DateTime<Local>) -> Option<DateTime<Local>>;
}

/// Cron cadence, evaluated in local wall-clock time.
impl Cadence for CronSchedule {
    fn next_fire_after(&self, after: DateTime<Local>) -> Option<DateTime<Local>> {
        self.next_after(&after)
    }
}

/// Fires at a fixed interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedInterval(pub Duration);

impl Cadence for FixedInterval {
    fn next_fire_after(&self, after: DateTime<Local>) -> Option<DateTime<Local>> {
        after.checked_add_signed(TimeDelta::from_std(self.0).ok()?)
    }
}

/// Next fire time for a timer that last fired at `previous`.
///
/// Counting from the later of `previous` and `now` means an occurrence is
/// never fired twice, even if the wall clock steps back after a wake-up.
pub(crate) fn next_fire(
    cadence: &dyn Cadence,
    previous: Option<DateTime<Local>>,
    now: DateTime<Local>,
) -> Option<DateTime<Local>> {
    let from = previous.map_or(now, |prev| prev.max(now));
    cadence.next_fire_after(from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 1, 15, h, m, s).single().unwrap()
    }

    #[test]
    fn fixed_interval_counts_from_reference() {
        let cadence = FixedInterval(Duration::from_millis(250));
        let start = at(10, 0, 0);
        assert_eq!(
            cadence.next_fire_after(start),
            Some(start + TimeDelta::milliseconds(250))
        );
    }

    #[test]
    fn cron_cadence_fires_on_next_match() {
        let cadence = CronSchedule::parse("*/5 * * * *").unwrap();
        assert_eq!(cadence.next_fire_after(at(10, 3, 0)), Some(at(10, 5, 0)));
    }

    #[test]
    fn first_fire_counts_from_now() {
        let cadence = CronSchedule::parse("*/5 * * * *").unwrap();
        assert_eq!(next_fire(&cadence, None, at(10, 1, 30)), Some(at(10, 5, 0)));
    }

    #[test]
    fn clock_stepping_back_does_not_repeat_an_occurrence() {
        let cadence = CronSchedule::parse("*/5 * * * *").unwrap();
        // Woke for 10:05:00 but the wall clock now reads slightly earlier.
        let next = next_fire(&cadence, Some(at(10, 5, 0)), at(10, 4, 59));
        assert_eq!(next, Some(at(10, 10, 0)));
    }

    #[test]
    fn late_wake_skips_missed_occurrences() {
        let cadence = CronSchedule::parse("*/5 * * * *").unwrap();
        let next = next_fire(&cadence, Some(at(10, 5, 0)), at(10, 17, 0));
        assert_eq!(next, Some(at(10, 20, 0)));
    }
}
