//! Time utilities: parsing user input, converting between the local civilian
//! timezone and stored UTC instants, hour arithmetic and formatting.
//!
//! Stored timestamps are UTC RFC 3339 with millisecond precision and a `Z`
//! suffix, so lexical order in SQL equals chronological order.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};

pub fn parse_time(t: &str) -> Option<NaiveTime> {
    let t = t.trim();
    NaiveTime::parse_from_str(t, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M:%S"))
        .ok()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Interpret a naive wall-clock value in the local timezone.
pub fn local_to_utc(naive: NaiveDateTime) -> AppResult<DateTime<Utc>> {
    naive
        .and_local_timezone(Local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| AppError::InvalidTime(format!("{naive} does not exist in local time")))
}

/// Parse `YYYY-MM-DDTHH:MM[:SS]` (or with a space) as local time.
pub fn parse_local_datetime(s: &str) -> AppResult<DateTime<Utc>> {
    let s = s.trim();
    let formats = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];

    for fmt in formats {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return local_to_utc(naive);
        }
    }

    Err(AppError::InvalidTime(s.to_string()))
}

/// Combine a date and a time of day given as text, in local time.
pub fn parse_local_date_time(date: &str, time: &str) -> AppResult<DateTime<Utc>> {
    let d = parse_date(date).ok_or_else(|| AppError::InvalidDate(date.to_string()))?;
    let t = parse_time(time).ok_or_else(|| AppError::InvalidTime(time.to_string()))?;
    local_to_utc(d.and_time(t))
}

pub fn to_db(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp. Offset-less legacy values are read as UTC.
pub fn from_db(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Elapsed time between two instants in fractional hours.
pub fn hours_between(start: &DateTime<Utc>, end: &DateTime<Utc>) -> f64 {
    (*end - *start).num_milliseconds() as f64 / 3_600_000.0
}

/// Longest span, in hours, accepted for thresholds and credits (one leap year).
pub const MAX_SPAN_HOURS: f64 = 24.0 * 366.0;

/// Fractional hours to a millisecond duration; fails outside `0..=MAX_SPAN_HOURS`.
pub fn hours_to_duration(hours: f64) -> AppResult<Duration> {
    if !(hours.is_finite() && (0.0..=MAX_SPAN_HOURS).contains(&hours)) {
        return Err(AppError::InvalidRange(format!(
            "{hours} hours is outside 0..={MAX_SPAN_HOURS}"
        )));
    }
    Duration::try_milliseconds((hours * 3_600_000.0).round() as i64)
        .ok_or_else(|| AppError::InvalidRange(format!("{hours} hours does not fit a duration")))
}

pub fn format_hours(hours: f64) -> String {
    format!("{:.2}", hours)
}

pub fn to_local(dt: &DateTime<Utc>) -> DateTime<Local> {
    dt.with_timezone(&Local)
}

pub fn format_local(dt: &DateTime<Utc>) -> String {
    to_local(dt).format("%Y-%m-%d %H:%M").to_string()
}

pub fn month_name(m: u32) -> &'static str {
    match m {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn stored_timestamps_round_trip_and_sort() {
        let a = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let b = a + Duration::minutes(150);

        assert_eq!(to_db(&a), "2024-01-01T08:00:00.000Z");
        assert_eq!(from_db(&to_db(&b)), Some(b));
        assert!(to_db(&a) < to_db(&b));
    }

    #[test]
    fn legacy_offsetless_values_are_utc() {
        let dt = from_db("2024-01-01T08:00:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap());
        assert!(from_db("yesterday").is_none());
    }

    #[test]
    fn fractional_hours() {
        let a = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 1, 1, 10, 30, 0).unwrap();
        assert_eq!(hours_between(&a, &b), 2.5);
        assert_eq!(a + hours_to_duration(2.5).unwrap(), b);
        assert_eq!(format_hours(2.5), "2.50");
    }

    #[test]
    fn huge_or_non_finite_hours_are_rejected() {
        assert!(matches!(hours_to_duration(1e300), Err(AppError::InvalidRange(_))));
        assert!(matches!(hours_to_duration(f64::NAN), Err(AppError::InvalidRange(_))));
        assert!(matches!(hours_to_duration(-1.0), Err(AppError::InvalidRange(_))));
        assert_eq!(hours_to_duration(1e-8).unwrap(), Duration::zero());
    }

    #[test]
    fn time_parsing() {
        assert!(parse_time("07:00").is_some());
        assert!(parse_time("07:00:30").is_some());
        assert!(parse_time("7am").is_none());
        assert!(matches!(
            parse_local_date_time("2024-13-01", "07:00"),
            Err(AppError::InvalidDate(_))
        ));
        assert!(matches!(
            parse_local_datetime("soon"),
            Err(AppError::InvalidTime(_))
        ));
    }
}
