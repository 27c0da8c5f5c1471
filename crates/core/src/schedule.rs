//! Schedule activity evaluation.
//!
//! A schedule is active at an instant when three independent checks agree:
//! the date range contains the day, the daily time window contains the
//! wall-clock time, and — when a recurrence rule is present — the rule has
//! an occurrence on that day. Any failing check short-circuits.
//!
//! Times are hotel-local wall clock; the evaluator is pure over the
//! `NaiveDateTime` handed to it and never consults the system clock.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::recurrence::{self, RecurrenceError};

/// Error for schedule definitions rejected at creation time.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// `start_time` must be strictly before `end_time`.
    #[error("schedule start time {start} must be before end time {end}")]
    InvertedTimeWindow { start: NaiveTime, end: NaiveTime },
}

/// The evaluator's view of a schedule: date range, daily time window, and
/// optional recurrence rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleWindow {
    pub start_date: NaiveDate,
    /// `None` means the schedule never expires by date.
    pub end_date: Option<NaiveDate>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// RFC 5545 RRULE text; `None` or empty means one-time.
    pub recurrence: Option<String>,
}

impl ScheduleWindow {
    /// The recurrence rule with the empty string normalized to `None`.
    fn rule(&self) -> Option<&str> {
        match self.recurrence.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(rule) => Some(rule),
        }
    }

    /// The anchor instant seeding the recurrence pattern.
    fn anchor(&self) -> chrono::DateTime<chrono::Utc> {
        self.start_date.and_time(self.start_time).and_utc()
    }
}

/// Enforce `start_time < end_time`. Called at schedule creation time by
/// the administrative layer; evaluation assumes it already holds.
pub fn validate_time_window(start: NaiveTime, end: NaiveTime) -> Result<(), ScheduleError> {
    if start < end {
        Ok(())
    } else {
        Err(ScheduleError::InvertedTimeWindow { start, end })
    }
}

/// Full activity check. Recurrence parse failures propagate so callers can
/// log them; use [`is_active_at`] to fail closed instead.
pub fn evaluate(window: &ScheduleWindow, now: NaiveDateTime) -> Result<bool, RecurrenceError> {
    let today = now.date();
    if today < window.start_date {
        return Ok(false);
    }
    if let Some(end) = window.end_date {
        if today > end {
            return Ok(false);
        }
    }
    let time = now.time();
    if time < window.start_time || time > window.end_time {
        return Ok(false);
    }
    match window.rule() {
        None => Ok(true),
        Some(rule) => recurrence::is_occurring_on(rule, window.anchor(), today),
    }
}

/// Activity check that fails closed: a malformed recurrence rule makes the
/// schedule inactive rather than erroring.
pub fn is_active_at(window: &ScheduleWindow, now: NaiveDateTime) -> bool {
    evaluate(window, now).unwrap_or(false)
}

/// The next `count` activation days, for display purposes.
///
/// Falls back to a one-element sequence holding the start date when the
/// rule cannot be evaluated, so callers always have something to show.
pub fn upcoming_occurrences(window: &ScheduleWindow, count: u16) -> Vec<NaiveDate> {
    match window.rule() {
        None => vec![window.start_date],
        Some(rule) => match recurrence::next_occurrences(rule, window.anchor(), count) {
            Ok(dates) => dates.into_iter().map(|d| d.date_naive()).collect(),
            Err(_) => vec![window.start_date],
        },
    }
}

/// Human description of the window's recurrence.
pub fn describe(window: &ScheduleWindow) -> String {
    match window.rule() {
        None => "one-time".to_string(),
        Some(rule) => recurrence::describe(rule),
    }
}
