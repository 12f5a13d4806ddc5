//! Derives temporal features from raw report timestamps.
//!
//! Malformed timestamps are expected in civic data feeds; parse failure
//! nulls the derived fields for that record instead of failing the run.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};

/// Timestamp formats tolerated by the parser, tried in order. Covers the
/// ISO forms the upstream API emits (space or `T` separator, optional
/// fractional seconds) and the US forms seen in older exports.
const FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
];

/// The four fields derived from a successfully parsed report timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalFeatures {
    pub year: i32,
    /// Month of year, 1-12.
    pub month: u32,
    /// Hour of day, 0-23.
    pub hour: u32,
    pub weekday: Weekday,
}

/// Parses a raw report timestamp with the tolerated format list.
/// Bare dates parse to midnight.
#[must_use]
pub fn parse_reported(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();

    for format in FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed);
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Derives the four temporal feature fields from a parsed timestamp.
#[must_use]
pub fn extract(timestamp: NaiveDateTime) -> TemporalFeatures {
    TemporalFeatures {
        year: timestamp.year(),
        month: timestamp.month(),
        hour: timestamp.hour(),
        weekday: timestamp.weekday(),
    }
}

/// Parses and extracts in one step; `None` for missing or unparseable
/// timestamps.
#[must_use]
pub fn features(raw: Option<&str>) -> Option<TemporalFeatures> {
    raw.and_then(parse_reported).map(extract)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_with_space_separator() {
        let features = features(Some("2023-06-15 21:30:00")).unwrap();
        assert_eq!(features.year, 2023);
        assert_eq!(features.month, 6);
        assert_eq!(features.hour, 21);
        assert_eq!(features.weekday, Weekday::Thu);
    }

    #[test]
    fn parses_iso_with_t_separator_and_fraction() {
        let features = features(Some("2023-06-15T21:30:00.000")).unwrap();
        assert_eq!(features.hour, 21);
    }

    #[test]
    fn parses_us_twelve_hour_form() {
        let features = features(Some("06/15/2023 09:30:00 PM")).unwrap();
        assert_eq!(features.year, 2023);
        assert_eq!(features.hour, 21);
    }

    #[test]
    fn bare_date_parses_to_midnight() {
        let features = features(Some("2023-06-15")).unwrap();
        assert_eq!(features.hour, 0);
    }

    #[test]
    fn unparseable_and_missing_are_none() {
        assert!(features(Some("not a timestamp")).is_none());
        assert!(features(Some("2023-15-99 10:00:00")).is_none());
        assert!(features(None).is_none());
    }

    #[test]
    fn weekday_matches_known_date() {
        // 2024-01-07 was a Sunday.
        let features = features(Some("2024-01-07 03:00:00")).unwrap();
        assert_eq!(features.weekday, Weekday::Sun);
    }
}
