// Timestamp coercion for raw SDK events
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

/// Convert a raw timestamp value into milliseconds since the Unix epoch.
///
/// Accepts integer or fractional milliseconds, numeric strings, and ISO 8601
/// / RFC 3339 strings. Returns `None` for anything else, including values
/// outside the representable calendar range.
pub fn parse_timestamp_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => {
            if let Some(millis) = number.as_i64() {
                return checked_millis(millis);
            }
            number.as_f64().and_then(millis_from_f64)
        }
        Value::String(text) => parse_timestamp_str(text),
        _ => None,
    }
}

/// Parse a textual timestamp: epoch milliseconds or an ISO 8601 date-time.
pub fn parse_timestamp_str(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(millis) = text.parse::<i64>() {
        return checked_millis(millis);
    }
    if let Ok(millis) = text.parse::<f64>() {
        return millis_from_f64(millis);
    }

    parse_iso8601(text).and_then(|dt| checked_millis(dt.timestamp_millis()))
}

/// Render epoch milliseconds as RFC 3339, falling back to the raw number.
pub fn format_millis(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
        .unwrap_or_else(|| millis.to_string())
}

fn parse_iso8601(text: &str) -> Option<DateTime<Utc>> {
    // Basic shape check before handing off to chrono
    if text.len() < 19 || text.chars().nth(4) != Some('-') || text.chars().nth(7) != Some('-') {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }

    None
}

fn millis_from_f64(millis: f64) -> Option<i64> {
    if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
        return None;
    }
    checked_millis(millis.floor() as i64)
}

fn checked_millis(millis: i64) -> Option<i64> {
    DateTime::<Utc>::from_timestamp_millis(millis).map(|_| millis)
}
