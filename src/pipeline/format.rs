//! Value formatting: dynamic JSON values → display strings.
//!
//! Both entry points are total. Whatever the payload contains, the result is
//! a string; the worst case is an empty string or the value's raw text.
//!
//! Dates are printed in the en-US style a browser produces for
//! `toLocaleString()` (`1/15/2024, 10:30:00 AM`), converted into the
//! configured time zone. [`format`] and [`format_date`] use UTC; the `_in`
//! variants take the zone explicitly and are what the renderers call.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Number, Value};

use crate::payload::is_truthy;

const LOCALE_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Only complete RFC 3339 instants count as "date-like" for [`format`].
static RE_RFC3339: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}[Tt ]\d{2}:\d{2}:\d{2}(\.\d+)?([Zz]|[+-]\d{2}:\d{2})$").unwrap()
});

/// Format any value for display, in UTC.
pub fn format(value: Option<&Value>) -> String {
    format_in(value, Tz::UTC)
}

/// Format any value for display, rendering date-like strings in `tz`.
///
/// | Input | Output |
/// |-------|--------|
/// | missing / `null` | `""` |
/// | `true` / `false` | `"Yes"` / `"No"` |
/// | array | elements formatted and joined with `", "` |
/// | RFC 3339 string | locale date/time |
/// | object | compact JSON |
/// | number | `3`, `2.5` (no trailing `.0`) |
/// | other string | unchanged |
pub fn format_in(value: Option<&Value>, tz: Tz) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::Bool(b)) => if *b { "Yes" } else { "No" }.to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| format_in(Some(item), tz))
            .collect::<Vec<_>>()
            .join(", "),
        Some(object @ Value::Object(_)) => serde_json::to_string(object).unwrap_or_default(),
        Some(Value::Number(n)) => format_number(n),
        Some(Value::String(s)) => {
            if RE_RFC3339.is_match(s.trim()) {
                if let Ok(dt) = DateTime::parse_from_rfc3339(s.trim()) {
                    return format_timestamp(dt.with_timezone(&Utc), tz);
                }
            }
            s.clone()
        }
    }
}

/// Format a value as a date, in UTC.
pub fn format_date(value: Option<&Value>) -> String {
    format_date_in(value, Tz::UTC)
}

/// Format a value as a date in `tz`.
///
/// Falsy input gives `""`. Input that doesn't parse as a date comes back as
/// its original string representation.
pub fn format_date_in(value: Option<&Value>, tz: Tz) -> String {
    if !is_truthy(value) {
        return String::new();
    }
    let Some(value) = value else {
        return String::new();
    };

    match value {
        Value::String(s) => match parse_date_string(s.trim(), tz) {
            Some(instant) => format_timestamp(instant, tz),
            None => s.clone(),
        },
        Value::Number(n) => n
            .as_f64()
            .filter(|ms| ms.is_finite())
            .and_then(|ms| DateTime::<Utc>::from_timestamp_millis(ms as i64))
            .map(|instant| format_timestamp(instant, tz))
            .unwrap_or_else(|| format_number(n)),
        other => format_in(Some(other), tz),
    }
}

/// Locale-style representation of an instant in `tz`.
pub fn format_timestamp(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format(LOCALE_FORMAT).to_string()
}

/// JavaScript-style number display: integral floats lose their `.0`.
pub fn format_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{:.0}", f),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Parse the date shapes an order payload realistically carries.
///
/// Local date-times without an offset are read as wall-clock time in `tz`;
/// a bare date is UTC midnight.
fn parse_date_string(s: &str, tz: Tz) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, pattern) {
            return tz
                .from_local_datetime(&naive)
                .earliest()
                .map(|local| local.with_timezone(&Utc));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    None
}
