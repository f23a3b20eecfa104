//! UTC-only calendar and clock helpers.
//!
//! Dates travel as `YYYY-MM-DD` strings and times of day as `HH:MM`.
//! Nothing here ever consults a local timezone.

use thiserror::Error;
use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    #[error("Invalid time format `{0}`, expected HH:MM")]
    Format(String),

    #[error("Time `{0}` is out of range")]
    Range(String),

    #[error("Invalid date `{0}`, expected a calendar date as YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Adding {minutes} minutes to {instant} leaves the supported calendar range")]
    Overflow { instant: String, minutes: i64 },
}

fn all_digits(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_digit)
}

/// Parses a strict `HH:MM` string into minutes since midnight.
pub fn parse_time_to_minutes(time: &str) -> Result<u16, TimeError> {
    let bytes = time.as_bytes();
    let well_formed =
        bytes.len() == 5 && bytes[2] == b':' && all_digits(&bytes[..2]) && all_digits(&bytes[3..]);
    if !well_formed {
        return Err(TimeError::Format(time.to_string()));
    }

    let hours: u16 = time[..2]
        .parse()
        .map_err(|_| TimeError::Format(time.to_string()))?;
    let minutes: u16 = time[3..]
        .parse()
        .map_err(|_| TimeError::Format(time.to_string()))?;

    if hours > 23 || minutes > 59 {
        return Err(TimeError::Range(time.to_string()));
    }

    Ok(hours * 60 + minutes)
}

/// Checks the exact `YYYY-MM-DD` shape and that the value names a real
/// calendar day. Returns the parsed date.
pub fn assert_iso_date(date: &str) -> Result<Date, TimeError> {
    let invalid = || TimeError::InvalidDate(date.to_string());
    let bytes = date.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && all_digits(&bytes[..4])
        && all_digits(&bytes[5..7])
        && all_digits(&bytes[8..]);
    if !well_formed {
        return Err(invalid());
    }

    let year: i32 = date[..4].parse().map_err(|_| invalid())?;
    let month: u8 = date[5..7].parse().map_err(|_| invalid())?;
    let day: u8 = date[8..].parse().map_err(|_| invalid())?;
    let month = Month::try_from(month).map_err(|_| invalid())?;

    Date::from_calendar_date(year, month, day).map_err(|_| invalid())
}

/// Day of week of midnight UTC on `date`, with 0 = Sunday.
pub fn to_day_of_week_utc(date: &str) -> Result<u8, TimeError> {
    Ok(assert_iso_date(date)?.weekday().number_days_from_sunday())
}

/// Composes the UTC instant `date` at `time`.
pub fn date_at_utc_time(date: &str, time: &str) -> Result<OffsetDateTime, TimeError> {
    let day = assert_iso_date(date)?;
    let minutes = parse_time_to_minutes(time)?;
    let clock = Time::from_hms((minutes / 60) as u8, (minutes % 60) as u8, 0)
        .map_err(|_| TimeError::Range(time.to_string()))?;

    Ok(PrimitiveDateTime::new(day, clock).assume_utc())
}

/// Whole minutes as a `Duration`, `None` when the seconds overflow.
pub fn minutes_duration(minutes: i64) -> Option<Duration> {
    minutes.checked_mul(60).map(Duration::seconds)
}

pub fn add_minutes(instant: OffsetDateTime, minutes: i64) -> Result<OffsetDateTime, TimeError> {
    minutes_duration(minutes)
        .and_then(|offset| instant.checked_add(offset))
        .ok_or_else(|| TimeError::Overflow {
            instant: to_iso(instant),
            minutes,
        })
}

/// Half-open `[start, end)` bounds of `date` in UTC. The last representable
/// day ends at its final instant instead of the following midnight.
pub fn utc_day_bounds(date: Date) -> (OffsetDateTime, OffsetDateTime) {
    let start = PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_utc();
    let end = match date.next_day() {
        Some(next) => PrimitiveDateTime::new(next, Time::MIDNIGHT).assume_utc(),
        None => PrimitiveDateTime::new(date, Time::MAX).assume_utc(),
    };
    (start, end)
}

/// The UTC calendar day an instant falls on.
pub fn utc_date(instant: OffsetDateTime) -> Date {
    instant.to_offset(UtcOffset::UTC).date()
}

pub fn format_iso_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Formats an instant as `YYYY-MM-DDTHH:MM:SS.sssZ`.
pub fn to_iso(instant: OffsetDateTime) -> String {
    let utc = instant.to_offset(UtcOffset::UTC);
    format!(
        "{}T{:02}:{:02}:{:02}.{:03}Z",
        format_iso_date(utc.date()),
        utc.hour(),
        utc.minute(),
        utc.second(),
        utc.millisecond()
    )
}

/// Serde adapter writing instants with millisecond precision and reading
/// any RFC 3339 timestamp.
pub mod iso_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::format_description::well_known::Rfc3339;
    use time::OffsetDateTime;

    pub fn serialize<S>(instant: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::to_iso(*instant))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&raw, &Rfc3339).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn parses_valid_times() {
        assert_eq!(parse_time_to_minutes("00:00"), Ok(0));
        assert_eq!(parse_time_to_minutes("09:30"), Ok(570));
        assert_eq!(parse_time_to_minutes("23:59"), Ok(1439));
    }

    #[test]
    fn rejects_malformed_times() {
        assert!(matches!(parse_time_to_minutes("9:00"), Err(TimeError::Format(_))));
        assert!(matches!(parse_time_to_minutes("09:0a"), Err(TimeError::Format(_))));
        assert!(matches!(parse_time_to_minutes("09:00:00"), Err(TimeError::Format(_))));
        assert!(matches!(parse_time_to_minutes(""), Err(TimeError::Format(_))));
    }

    #[test]
    fn rejects_out_of_range_times() {
        assert_eq!(
            parse_time_to_minutes("24:00"),
            Err(TimeError::Range("24:00".to_string()))
        );
        assert_eq!(
            parse_time_to_minutes("10:60"),
            Err(TimeError::Range("10:60".to_string()))
        );
    }

    #[test]
    fn validates_iso_dates() {
        assert!(assert_iso_date("2026-01-16").is_ok());
        assert!(assert_iso_date("2024-02-29").is_ok());
        assert!(assert_iso_date("2026-1-16").is_err());
        assert!(assert_iso_date("2026-13-01").is_err());
        assert!(assert_iso_date("2025-02-29").is_err());
        assert!(assert_iso_date("2026-01-16T00:00").is_err());
    }

    #[test]
    fn day_of_week_is_utc_based() {
        assert_eq!(to_day_of_week_utc("2026-01-16"), Ok(5));
        assert_eq!(to_day_of_week_utc("2026-01-18"), Ok(0));
    }

    #[test]
    fn composes_utc_instants() {
        let instant = date_at_utc_time("2026-01-16", "09:15").unwrap();
        assert_eq!(instant, datetime!(2026-01-16 09:15 UTC));
        assert_eq!(to_iso(instant), "2026-01-16T09:15:00.000Z");
        assert!(date_at_utc_time("2026-01-16", "25:00").is_err());
        assert!(date_at_utc_time("16/01/2026", "09:00").is_err());
    }

    #[test]
    fn adds_negative_minutes() {
        let instant = datetime!(2026-01-16 00:10 UTC);
        assert_eq!(add_minutes(instant, -20), Ok(datetime!(2026-01-15 23:50 UTC)));
        assert_eq!(add_minutes(instant, 50), Ok(datetime!(2026-01-16 01:00 UTC)));
    }

    #[test]
    fn adding_minutes_past_the_calendar_end_is_an_error() {
        let last_quarter = datetime!(9999-12-31 23:45 UTC);
        assert!(matches!(
            add_minutes(last_quarter, 30),
            Err(TimeError::Overflow { minutes: 30, .. })
        ));
        assert_eq!(add_minutes(last_quarter, 14), Ok(datetime!(9999-12-31 23:59 UTC)));
        assert!(add_minutes(datetime!(2026-01-16 09:00 UTC), i64::MAX).is_err());
        assert!(add_minutes(datetime!(2026-01-16 09:00 UTC), i64::MIN).is_err());
    }

    #[test]
    fn day_bounds_cover_the_last_calendar_day() {
        let (start, end) = utc_day_bounds(date!(2026-01-16));
        assert_eq!(start, datetime!(2026-01-16 00:00 UTC));
        assert_eq!(end, datetime!(2026-01-17 00:00 UTC));

        let (start, end) = utc_day_bounds(Date::MAX);
        assert_eq!(start, datetime!(9999-12-31 00:00 UTC));
        assert!(end > datetime!(9999-12-31 23:59:59 UTC));
    }

    #[test]
    fn formats_dates_of_offset_instants_in_utc() {
        let instant = datetime!(2026-01-16 23:30 -03:00);
        assert_eq!(format_iso_date(utc_date(instant)), "2026-01-17");
        assert_eq!(to_iso(instant), "2026-01-17T02:30:00.000Z");
    }
}
