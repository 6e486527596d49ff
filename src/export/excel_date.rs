use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Excel serial value and number format for a date, date-time or time of day.
pub(crate) fn parse_to_excel_date(s: &str) -> Option<(&'static str, f64)> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M") {
        return excel_serial(&dt).map(|v| ("yyyy-mm-dd hh:mm", v));
    }

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return excel_serial(&d.and_time(NaiveTime::MIN)).map(|v| ("yyyy-mm-dd", v));
    }

    if let Ok(t) = NaiveTime::parse_from_str(s, "%H:%M") {
        let seconds = t.num_seconds_from_midnight() as f64;
        return Some(("hh:mm", seconds / 86400.0));
    }

    None
}

fn excel_serial(dt: &NaiveDateTime) -> Option<f64> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_time(NaiveTime::MIN);
    let secs = (*dt - epoch).num_seconds() as f64;
    Some(secs / 86400.0)
}
