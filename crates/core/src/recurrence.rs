//! Recurrence rule evaluation, wrapping the `rrule` crate (RFC 5545).
//!
//! Every recurrence string in the system passes through this module; no
//! other code touches `rrule` types. Malformed rules surface as
//! [`RecurrenceError`] and callers are expected to fail closed — treat the
//! schedule as never occurring — so bad data can hide content but never
//! show it at the wrong time.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rrule::{RRule, RRuleSet, Tz, Unvalidated};

/// Error raised for a recurrence string the parser or validator rejects.
#[derive(Debug, thiserror::Error)]
pub enum RecurrenceError {
    /// The rule text could not be parsed or validated against its anchor.
    #[error("invalid recurrence rule `{rule}`: {source}")]
    Invalid {
        rule: String,
        #[source]
        source: rrule::RRuleError,
    },
}

/// Check whether `rule` is syntactically acceptable.
///
/// Used at schedule-creation time. The empty string is accepted and means
/// "one-time, no recurrence"; evaluation layers normalize it to `None`
/// before the parser ever sees it.
pub fn is_valid_rule(rule: &str) -> bool {
    let trimmed = rule.trim();
    if trimmed.is_empty() {
        return true;
    }
    trimmed.parse::<RRule<Unvalidated>>().is_ok()
}

/// True when the rule anchored at `dtstart` has an occurrence within
/// `[day 00:00:00, day 23:59:59]` UTC.
pub fn is_occurring_on(
    rule: &str,
    dtstart: DateTime<Utc>,
    day: NaiveDate,
) -> Result<bool, RecurrenceError> {
    let set = build_set(rule, dtstart)?;
    let midnight = day.and_time(NaiveTime::MIN).and_utc();
    // Pad the lower bound so a midnight occurrence is never lost to an
    // exclusive range check.
    let from = midnight - Duration::seconds(1);
    let until = midnight + Duration::days(1) - Duration::seconds(1);
    let result = set
        .after(from.with_timezone(&Tz::UTC))
        .before(until.with_timezone(&Tz::UTC))
        .all(2);
    Ok(result.dates.iter().any(|d| d.date_naive() == day))
}

/// The next `count` occurrences of `rule` anchored at `dtstart`, in
/// ascending order. Finite, freshly computed on every call.
pub fn next_occurrences(
    rule: &str,
    dtstart: DateTime<Utc>,
    count: u16,
) -> Result<Vec<DateTime<Utc>>, RecurrenceError> {
    let set = build_set(rule, dtstart)?;
    let result = set.all(count);
    Ok(result
        .dates
        .into_iter()
        .map(|d| d.with_timezone(&Utc))
        .collect())
}

/// Best-effort human description of a rule, e.g. `"every 2 weeks"`.
///
/// Display-only: a rule that cannot be parsed is echoed back verbatim so
/// operators see what is stored instead of an error.
pub fn describe(rule: &str) -> String {
    let trimmed = rule.trim();
    if trimmed.is_empty() {
        return "one-time".to_string();
    }
    if !is_valid_rule(trimmed) {
        return trimmed.to_string();
    }

    let mut freq = None;
    let mut interval: u32 = 1;
    let body = trimmed.strip_prefix("RRULE:").unwrap_or(trimmed);
    for part in body.split(';') {
        if let Some((key, value)) = part.split_once('=') {
            if key.eq_ignore_ascii_case("FREQ") {
                freq = Some(value.to_ascii_uppercase());
            } else if key.eq_ignore_ascii_case("INTERVAL") {
                interval = value.parse().unwrap_or(1);
            }
        }
    }
    let unit = match freq.as_deref() {
        Some("SECONDLY") => "second",
        Some("MINUTELY") => "minute",
        Some("HOURLY") => "hour",
        Some("DAILY") => "day",
        Some("WEEKLY") => "week",
        Some("MONTHLY") => "month",
        Some("YEARLY") => "year",
        _ => return trimmed.to_string(),
    };
    if interval <= 1 {
        format!("every {unit}")
    } else {
        format!("every {interval} {unit}s")
    }
}

/// Parse and validate `rule`, producing a set anchored at `dtstart`.
fn build_set(rule: &str, dtstart: DateTime<Utc>) -> Result<RRuleSet, RecurrenceError> {
    let invalid = |source| RecurrenceError::Invalid {
        rule: rule.to_string(),
        source,
    };
    let parsed: RRule<Unvalidated> = rule.trim().parse().map_err(invalid)?;
    let start = dtstart.with_timezone(&Tz::UTC);
    let validated = parsed.validate(start).map_err(invalid)?;
    Ok(RRuleSet::new(start).rrule(validated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn daily_rule_yields_strictly_increasing_day_apart_occurrences() {
        let dates = next_occurrences("FREQ=DAILY;INTERVAL=1", anchor(), 5).unwrap();
        assert_eq!(dates.len(), 5);
        for pair in dates.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::days(1));
        }
    }

    #[test]
    fn daily_rule_occurs_on_a_future_day() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert!(is_occurring_on("FREQ=DAILY", anchor(), day).unwrap());
    }

    #[test]
    fn weekly_rule_skips_off_days() {
        // Anchored on a Wednesday (2025-01-01).
        let wednesday = NaiveDate::from_ymd_opt(2025, 1, 8).unwrap();
        let thursday = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        assert!(is_occurring_on("FREQ=WEEKLY", anchor(), wednesday).unwrap());
        assert!(!is_occurring_on("FREQ=WEEKLY", anchor(), thursday).unwrap());
    }

    #[test]
    fn malformed_rule_is_an_error_not_a_panic() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert!(is_occurring_on("NOT_A_RULE", anchor(), day).is_err());
        assert!(next_occurrences("NOT_A_RULE", anchor(), 5).is_err());
    }

    #[test]
    fn validation_accepts_real_rules_and_rejects_garbage() {
        assert!(is_valid_rule("FREQ=DAILY;INTERVAL=1"));
        assert!(is_valid_rule("FREQ=WEEKLY"));
        assert!(!is_valid_rule("NOT_A_RULE"));
    }

    #[test]
    fn empty_rule_is_valid_and_means_one_time() {
        assert!(is_valid_rule(""));
        assert!(is_valid_rule("   "));
        assert_eq!(describe(""), "one-time");
    }

    #[test]
    fn describe_summarizes_common_rules() {
        assert_eq!(describe("FREQ=DAILY"), "every day");
        assert_eq!(describe("FREQ=WEEKLY;INTERVAL=2"), "every 2 weeks");
    }

    #[test]
    fn describe_echoes_unparseable_rules() {
        assert_eq!(describe("NOT_A_RULE"), "NOT_A_RULE");
    }
}
