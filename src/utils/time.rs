use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::warn;

/// Local date-time layouts PowerShell's `[DateTime]` parsing takes besides RFC 3339
const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Check whether a string looks like an ISO-8601 timestamp.
///
/// Accepts RFC 3339 (`2024-06-01T09:00:00Z`, `2024-06-01T09:00:00+03:00`),
/// local date-times with a `T` or space separator, with or without seconds,
/// and plain dates.
pub fn is_iso8601(value: &str) -> bool {
    let value = value.trim();
    if DateTime::parse_from_rfc3339(value).is_ok() {
        return true;
    }
    if NAIVE_FORMATS
        .iter()
        .any(|format| NaiveDateTime::parse_from_str(value, format).is_ok())
    {
        return true;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Note a timestamp the script may not understand.
///
/// The value is still passed through; the script's own date parsing has the
/// final say. Returns whether the value looked like ISO 8601.
pub fn check_timestamp(field: &str, value: Option<&str>) -> bool {
    match value {
        Some(value) if !value.is_empty() && !is_iso8601(value) => {
            warn!(field, value, "timestamp is not ISO 8601; passing it to the script as-is");
            false
        }
        _ => true,
    }
}
