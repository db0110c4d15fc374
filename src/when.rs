//! Best-effort resolution of the moment an event record refers to.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// String fields probed, in priority order, when there is no numeric `time`.
const DATE_KEYS: [&str; 4] = ["date", "local_date", "utc_time", "iso_time"];

/// Resolve an event-like record to an absolute UTC instant.
///
/// Candidates are tried in order, first success wins: a numeric `time` field
/// as epoch milliseconds, then each of `DATE_KEYS` parsed as full ISO-8601
/// (trailing `Z` or an explicit offset; a datetime with neither is read as
/// UTC) and, failing that, as a bare `YYYY-MM-DD` at UTC midnight. Every
/// parse failure is swallowed; a record with no usable candidate is `None`,
/// never an error.
pub fn resolve(record: &Value) -> Option<DateTime<Utc>> {
    if let Some(at) = record.get("time").and_then(epoch_ms) {
        return Some(at);
    }
    for key in DATE_KEYS {
        let Some(raw) = record.get(key).and_then(Value::as_str) else {
            continue;
        };
        if let Some(at) = parse_iso(raw).or_else(|| parse_bare_date(raw)) {
            return Some(at);
        }
    }
    None
}

/// Milliseconds since the Unix epoch; integers and floats both appear in
/// the wild.
fn epoch_ms(value: &Value) -> Option<DateTime<Utc>> {
    let ms = value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))?;
    DateTime::from_timestamp_millis(ms)
}

fn parse_iso(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    // No offset at all: the canonical store is UTC, so read it as such.
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

fn parse_bare_date(raw: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}
