//! Textual timestamps carried in token claims.
//!
//! Timestamps are written as UTC with microsecond precision, for example
//! `2026-03-01 14:05:09.123456`. Comparisons always happen on parsed instants.

use chrono::{DateTime, NaiveDateTime, ParseError, Utc};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

const PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ParseError> {
    NaiveDateTime::parse_from_str(value.trim(), PARSE_FORMAT).map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn formats_with_microseconds() {
        let instant = Utc.with_ymd_and_hms(2026, 3, 1, 14, 5, 9).unwrap()
            + Duration::microseconds(123_456);
        assert_eq!(format_timestamp(instant), "2026-03-01 14:05:09.123456");
    }

    #[test]
    fn parse_inverts_format() {
        let instant = Utc.with_ymd_and_hms(2026, 12, 31, 23, 59, 59).unwrap()
            + Duration::microseconds(7);
        assert_eq!(parse_timestamp(&format_timestamp(instant)).unwrap(), instant);
    }

    #[test]
    fn parse_rejects_other_layouts() {
        assert!(parse_timestamp("2026-03-01T14:05:09Z").is_err());
        assert!(parse_timestamp("yesterday").is_err());
        assert!(parse_timestamp("").is_err());
    }

    #[test]
    fn ordering_follows_instants_not_text() {
        // Lexically "2026-03-01 9..." would sort after "2026-03-01 10...".
        let earlier = parse_timestamp("2026-03-01 09:00:00.000000").unwrap();
        let later = parse_timestamp("2026-03-01 10:00:00.000000").unwrap();
        assert!(earlier < later);
    }
}
