//! Shared utility functions

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

/// Parse a datetime string (RFC3339 format) or return current time
///
/// This helper is used throughout the database layer to handle datetime parsing
/// with a fallback to the current time if parsing fails.
pub fn parse_datetime_or_now(s: &str) -> DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Format a timestamp for storage
///
/// Always UTC with microsecond precision, so the lexical order of stored
/// values matches their chronological order.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Decode a UUID stored as text
pub fn parse_uuid(s: &str) -> Result<Uuid, sqlx::Error> {
    Uuid::parse_str(s).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_datetime_or_now() {
        let valid_time = "2024-01-01T12:00:00Z";
        let parsed = parse_datetime_or_now(valid_time);
        assert_eq!(parsed.to_rfc3339(), "2024-01-01T12:00:00+00:00");

        // Invalid time should return current time (just check it doesn't panic)
        let invalid_time = "invalid";
        let now_before = Utc::now();
        let parsed = parse_datetime_or_now(invalid_time);
        let now_after = Utc::now();
        assert!(parsed >= now_before && parsed <= now_after);
    }

    #[test]
    fn test_format_datetime_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let fractional = whole + chrono::Duration::microseconds(1500);

        assert_eq!(format_datetime(&whole), "2024-01-01T12:00:00.000000Z");
        assert_eq!(format_datetime(&fractional), "2024-01-01T12:00:00.001500Z");
        assert!(format_datetime(&whole) < format_datetime(&fractional));
        assert_eq!(parse_datetime_or_now(&format_datetime(&fractional)), fractional);
    }

    #[test]
    fn test_parse_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_uuid(&id.to_string()).unwrap(), id);
        assert!(parse_uuid("not-a-uuid").is_err());
    }
}
