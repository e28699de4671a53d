//! Deadline parsing and date arithmetic.
//!
//! Deadlines are stored as `NaiveDate`. Text only exists at the edges: the
//! form input (`parse_deadline_input`) and the seed file (`lenient_date`).

use chrono::{DateTime, Datelike, NaiveDate, TimeDelta};

/// Parse human-readable deadline input relative to `today`.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - "next monday", "this friday", bare weekday names ("fri", "monday")
/// - "end of week" / "eow", "end of month" / "eom", "weekend"
/// - "in 3d", "in 2w", "in 1m"
/// - "YYYY-MM-DD"
pub fn parse_deadline_input(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();

    match s.as_str() {
        "" => return None,
        "today" => return Some(today),
        "tomorrow" => return shift(today, 1),
        "yesterday" => return shift(today, -1),
        "end of week" | "eow" => return start_end_of_week(today).map(|(_, end)| end),
        "end of month" | "eom" => return end_of_month(today),
        "this weekend" | "weekend" => {
            let days_until_saturday = (5 + 7 - today.weekday().num_days_from_monday() as i64) % 7;
            return shift(today, days_until_saturday);
        }
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        let rest = rest.trim();
        // Months are approximated as 30 days.
        for (suffix, days_per_unit) in [("d", 1), ("w", 7), ("m", 30)] {
            if let Some(num) = rest.strip_suffix(suffix) {
                if let Ok(n) = num.trim().parse::<i64>() {
                    return n.checked_mul(days_per_unit).and_then(|days| shift(today, days));
                }
            }
        }
    }

    let (next, day_name) = if let Some(rest) = s.strip_prefix("next ") {
        (true, rest.trim())
    } else if let Some(rest) = s.strip_prefix("this ") {
        (false, rest.trim())
    } else {
        (false, s.as_str())
    };
    if let Some(target) = weekday_index(day_name) {
        let current = today.weekday().num_days_from_monday() as i64;
        let ahead = (target + 7 - current) % 7;
        let ahead = if next { ahead + 7 } else { ahead };
        return shift(today, ahead);
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

fn weekday_index(name: &str) -> Option<i64> {
    let idx = match name {
        "monday" | "mon" => 0,
        "tuesday" | "tue" => 1,
        "wednesday" | "wed" => 2,
        "thursday" | "thu" => 3,
        "friday" | "fri" => 4,
        "saturday" | "sat" => 5,
        "sunday" | "sun" => 6,
        _ => return None,
    };
    Some(idx)
}

/// `date` moved by `days`, or `None` outside chrono's date range.
fn shift(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    TimeDelta::try_days(days).and_then(|delta| date.checked_add_signed(delta))
}

/// Start and end of the ISO week (Monday to Sunday) containing `today`.
pub fn start_end_of_week(today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let weekday = today.weekday().num_days_from_monday() as i64;
    let start = shift(today, -weekday)?;
    Some((start, shift(start, 6)?))
}

fn end_of_month(today: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)?.pred_opt()
}

/// Whole days from `today` to `deadline`. Negative once the deadline has passed.
pub fn days_until(deadline: NaiveDate, today: NaiveDate) -> i64 {
    (deadline - today).num_days()
}

/// Parse a stored date string: `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_stored_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// Serde adapter for seed deadlines.
///
/// Missing, empty or unparsable values become `None` instead of failing the
/// whole seed; such tasks sort as the latest deadline.
pub mod lenient_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
        Ok(match raw {
            Some(serde_json::Value::String(s)) => {
                let parsed = super::parse_stored_date(&s);
                if parsed.is_none() && !s.trim().is_empty() {
                    tracing::warn!(value = %s, "unparsable deadline in seed, treating as latest");
                }
                parsed
            }
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_relative_words() {
        // 2024-11-20 is a Wednesday.
        let today = d(2024, 11, 20);
        assert_eq!(parse_deadline_input("today", today), Some(today));
        assert_eq!(parse_deadline_input(" Tomorrow ", today), Some(d(2024, 11, 21)));
        assert_eq!(parse_deadline_input("yesterday", today), Some(d(2024, 11, 19)));
        assert_eq!(parse_deadline_input("in 3d", today), Some(d(2024, 11, 23)));
        assert_eq!(parse_deadline_input("in 2w", today), Some(d(2024, 12, 4)));
        assert_eq!(parse_deadline_input("eow", today), Some(d(2024, 11, 24)));
        assert_eq!(parse_deadline_input("end of month", today), Some(d(2024, 11, 30)));
        assert_eq!(parse_deadline_input("weekend", today), Some(d(2024, 11, 23)));
    }

    #[test]
    fn test_parse_weekdays() {
        let today = d(2024, 11, 20);
        assert_eq!(parse_deadline_input("fri", today), Some(d(2024, 11, 22)));
        assert_eq!(parse_deadline_input("this friday", today), Some(d(2024, 11, 22)));
        assert_eq!(parse_deadline_input("wednesday", today), Some(today));
        assert_eq!(parse_deadline_input("next monday", today), Some(d(2024, 12, 2)));
    }

    #[test]
    fn test_parse_iso_and_rejects_garbage() {
        let today = d(2024, 11, 20);
        assert_eq!(parse_deadline_input("2024-12-25", today), Some(d(2024, 12, 25)));
        assert_eq!(parse_deadline_input("", today), None);
        assert_eq!(parse_deadline_input("someday", today), None);
        assert_eq!(parse_deadline_input("2024-13-01", today), None);
    }

    #[test]
    fn test_end_of_month_in_december() {
        assert_eq!(parse_deadline_input("eom", d(2024, 12, 5)), Some(d(2024, 12, 31)));
    }

    #[test]
    fn test_out_of_range_offsets_are_rejected() {
        let today = d(2024, 11, 20);
        assert_eq!(parse_deadline_input("in 1000000000d", today), None);
        assert_eq!(parse_deadline_input("in 999999999999999999m", today), None);
        assert_eq!(parse_deadline_input("in -1000000000w", today), None);
        assert_eq!(parse_deadline_input("tomorrow", NaiveDate::MAX), None);
        assert_eq!(parse_deadline_input("yesterday", NaiveDate::MIN), None);
        assert_eq!(parse_deadline_input("next monday", NaiveDate::MAX), None);
    }

    #[test]
    fn test_days_until() {
        let today = d(2024, 11, 20);
        assert_eq!(days_until(d(2024, 11, 22), today), 2);
        assert_eq!(days_until(today, today), 0);
        assert_eq!(days_until(d(2024, 11, 19), today), -1);
    }

    #[test]
    fn test_parse_stored_date() {
        assert_eq!(parse_stored_date("2024-11-22"), Some(d(2024, 11, 22)));
        assert_eq!(parse_stored_date("2024-11-22T10:00:00Z"), Some(d(2024, 11, 22)));
        assert_eq!(parse_stored_date("not a date"), None);
    }
}
