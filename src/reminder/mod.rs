//! Reminder schedule evaluation for the external notification timer.
//!
//! Nothing here reads or writes ledger data: the scheduler polls
//! [`ReminderTracker::poll`] once per minute with the settings' schedule and
//! the wall clock, and shows whatever comes back.

use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, Result};

pub const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

const WEEKDAY_VALUES: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Daily and weekly reminder times as persisted in settings (`HH:MM`, `Mon`..`Sun`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReminderSchedule {
    #[serde(rename = "daily_reminder_time", default = "default_time")]
    pub daily_time: String,
    #[serde(rename = "weekly_reminder_day", default = "default_day")]
    pub weekly_day: String,
    #[serde(rename = "weekly_reminder_time", default = "default_time")]
    pub weekly_time: String,
}

fn default_time() -> String {
    "21:00".into()
}

fn default_day() -> String {
    "Sun".into()
}

impl Default for ReminderSchedule {
    fn default() -> Self {
        Self {
            daily_time: default_time(),
            weekly_day: default_day(),
            weekly_time: default_time(),
        }
    }
}

impl ReminderSchedule {
    /// Checks every field, returning the first parse failure.
    pub fn validate(&self) -> Result<()> {
        parse_time_of_day(&self.daily_time)?;
        parse_weekday(&self.weekly_day)?;
        parse_time_of_day(&self.weekly_time)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReminderKind {
    Daily,
    Weekly,
}

impl ReminderKind {
    pub fn title(self) -> &'static str {
        match self {
            ReminderKind::Daily => "Reminder",
            ReminderKind::Weekly => "Weekly Reminder",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ReminderKind::Daily => "Log today's expenses!",
            ReminderKind::Weekly => "Review your weekly spending and log missing entries.",
        }
    }
}

/// Parses a 24-hour `HH:MM` time of day.
pub fn parse_time_of_day(input: &str) -> Result<NaiveTime> {
    let invalid = || LedgerError::InvalidInput(format!("invalid time `{}` (use HH:MM)", input));
    let (hh, mm) = input.trim().split_once(':').ok_or_else(invalid)?;
    let hour: u32 = hh.trim().parse().map_err(|_| invalid())?;
    let minute: u32 = mm.trim().parse().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// Parses the three-letter weekday labels used in settings.
pub fn parse_weekday(input: &str) -> Result<Weekday> {
    let trimmed = input.trim();
    WEEKDAYS
        .iter()
        .position(|label| label.eq_ignore_ascii_case(trimmed))
        .map(|idx| WEEKDAY_VALUES[idx])
        .ok_or_else(|| {
            LedgerError::InvalidInput(format!(
                "invalid weekday `{}` (use one of {})",
                input,
                WEEKDAYS.join(", ")
            ))
        })
}

/// Reminders whose scheduled minute matches `now`.
pub fn due_reminders(schedule: &ReminderSchedule, now: NaiveDateTime) -> Result<Vec<ReminderKind>> {
    let mut due = Vec::new();
    let daily = parse_time_of_day(&schedule.daily_time)?;
    if same_minute(daily, now) {
        due.push(ReminderKind::Daily);
    }
    let weekday = parse_weekday(&schedule.weekly_day)?;
    let weekly = parse_time_of_day(&schedule.weekly_time)?;
    if now.weekday() == weekday && same_minute(weekly, now) {
        due.push(ReminderKind::Weekly);
    }
    Ok(due)
}

fn same_minute(time: NaiveTime, now: NaiveDateTime) -> bool {
    time.hour() == now.hour() && time.minute() == now.minute()
}

/// Suppresses repeat notifications when the timer polls more than once in a minute.
#[derive(Debug, Default)]
pub struct ReminderTracker {
    last_daily: Option<NaiveDateTime>,
    last_weekly: Option<NaiveDateTime>,
}

impl ReminderTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poll(&mut self, schedule: &ReminderSchedule, now: NaiveDateTime) -> Result<Vec<ReminderKind>> {
        let minute = truncate_to_minute(now);
        let mut fired = Vec::new();
        for kind in due_reminders(schedule, now)? {
            let slot = match kind {
                ReminderKind::Daily => &mut self.last_daily,
                ReminderKind::Weekly => &mut self.last_weekly,
            };
            if *slot != Some(minute) {
                *slot = Some(minute);
                fired.push(kind);
            }
        }
        Ok(fired)
    }
}

fn truncate_to_minute(now: NaiveDateTime) -> NaiveDateTime {
    now.with_second(0)
        .and_then(|value| value.with_nanosecond(0))
        .unwrap_or(now)
}
