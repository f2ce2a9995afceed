//! Timestamp parsing and display formatting.
//!
//! Timestamps without an offset are read as UTC, and all display labels are
//! rendered in UTC to match the dashboard clock.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Offset-less layouts accepted in addition to RFC 3339 and RFC 2822.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Placeholder for a missing or unparseable date-time.
pub const NO_DATE: &str = "--";

/// Placeholder for a missing or unparseable clock time.
pub const NO_TIME: &str = "--:--";

/// Parse a snapshot timestamp.
///
/// Numbers are epoch milliseconds; zero counts as absent.
pub fn parse_instant(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_instant_str(s),
        Value::Number(n) => {
            let millis = n.as_f64()?;
            if millis == 0.0 || !millis.is_finite() {
                return None;
            }
            DateTime::from_timestamp_millis(millis as i64)
        }
        _ => None,
    }
}

/// Parse a timestamp string in any of the accepted layouts.
pub fn parse_instant_str(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_rfc2822(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Format a clock label, e.g. "14:05".
pub fn format_time(ts: &DateTime<Utc>) -> String {
    ts.format("%H:%M").to_string()
}

/// Format a full date-time label, e.g. "Feb 10, 2026 14:05".
pub fn format_date_time(ts: &DateTime<Utc>) -> String {
    ts.format("%b %d, %Y %H:%M").to_string()
}

/// Parse and format an optional date-time string, falling back to [`NO_DATE`].
pub fn date_time_label(raw: Option<&str>) -> String {
    raw.and_then(parse_instant_str)
        .map(|ts| format_date_time(&ts))
        .unwrap_or_else(|| NO_DATE.to_string())
}

/// Format the dashboard clock, e.g. "14:05:09 UTC".
pub fn format_clock(ts: &DateTime<Utc>) -> String {
    ts.format("%H:%M:%S UTC").to_string()
}
