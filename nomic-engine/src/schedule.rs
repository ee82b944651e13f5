//! Weekly famine-cycle calendar.

use chrono::{DateTime, Datelike, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Calendar collaborator deciding when famine cycles fire.
pub trait Scheduler {
    /// Next fire time strictly after `after`, or `None` when nothing is
    /// scheduled.
    fn next_run(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>>;
}

/// Fires once a week at a fixed UTC wall-clock time.
///
/// `weekday` follows the cron convention: 0 = Sunday through 6 = Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeeklySchedule {
    pub weekday: u8,
    pub hour: u8,
    pub minute: u8,
}

impl Default for WeeklySchedule {
    /// Wednesday 15:00 UTC, the game's traditional famine slot.
    fn default() -> Self {
        Self {
            weekday: 3,
            hour: 15,
            minute: 0,
        }
    }
}

impl Scheduler for WeeklySchedule {
    fn next_run(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let time = NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0)?;
        let mut day = after.date_naive();
        for _ in 0..=7 {
            if day.weekday().num_days_from_sunday() == u32::from(self.weekday) {
                let candidate = day.and_time(time).and_utc();
                if candidate > after {
                    return Some(candidate);
                }
            }
            day = day.succ_opt()?;
        }
        None
    }
}

/// Scheduler with no installed job; `next_run` is always `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unscheduled;

impl Scheduler for Unscheduled {
    fn next_run(&self, _after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        None
    }
}

/// Renders a next-run time as `M/D/YY HH:mm z` (for example
/// `1/8/25 15:00 UTC`), or `NONE` when nothing is scheduled.
#[must_use]
pub fn format_next_run(next: Option<DateTime<Utc>>) -> String {
    match next {
        Some(at) => at.format("%-m/%-d/%y %H:%M UTC").to_string(),
        None => "NONE".to_string(),
    }
}
