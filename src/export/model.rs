use crate::models::time_entry::TimeEntry;
use crate::utils::time::{format_hours, to_local};
use serde::Serialize;

/// One payroll line: a single time log entry, flattened for export.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct PayrollExport {
    pub fireman_number: String,
    pub full_name: String,
    pub date: String,
    pub time_in: String,
    pub time_out: String,
    pub activity: String,
    pub hours: String,
    pub manual: bool,
    pub auto_checkout: bool,
}

impl PayrollExport {
    /// Flatten one entry. Times are shown in local time; a session ending on
    /// another day shows its full end date. Open entries have an empty
    /// `time_out` and count zero hours.
    pub fn from_entry(entry: &TimeEntry, fireman_number: &str, full_name: &str) -> Self {
        let time_in = entry.time_in;
        let time_out = entry.time_out;
        let local_in = to_local(&time_in);

        let time_out_str = match time_out.map(|t| to_local(&t)) {
            None => String::new(),
            Some(out) if out.date_naive() == local_in.date_naive() => {
                out.format("%H:%M").to_string()
            }
            Some(out) => out.format("%Y-%m-%d %H:%M").to_string(),
        };

        let hours = if entry.is_open() {
            0.0
        } else {
            entry.effective_hours()
        };

        Self {
            fireman_number: fireman_number.to_string(),
            full_name: full_name.to_string(),
            date: local_in.format("%Y-%m-%d").to_string(),
            time_in: local_in.format("%H:%M").to_string(),
            time_out: time_out_str,
            activity: entry.category.clone(),
            hours: format_hours(hours),
            manual: entry.is_manual(),
            auto_checkout: entry.auto_checkout,
        }
    }
}

pub(crate) fn get_headers() -> Vec<&'static str> {
    vec![
        "fireman_number",
        "full_name",
        "date",
        "time_in",
        "time_out",
        "activity",
        "hours",
        "manual",
        "auto_checkout",
    ]
}

fn flag(b: bool) -> String {
    if b { "yes".into() } else { String::new() }
}

/// Text cells for table-shaped outputs (XLSX, PDF).
pub(crate) fn payroll_to_row(p: &PayrollExport) -> Vec<String> {
    vec![
        p.fireman_number.clone(),
        p.full_name.clone(),
        p.date.clone(),
        p.time_in.clone(),
        p.time_out.clone(),
        p.activity.clone(),
        p.hours.clone(),
        flag(p.manual),
        flag(p.auto_checkout),
    ]
}

pub(crate) fn payroll_to_table(rows: &[PayrollExport]) -> Vec<Vec<String>> {
    rows.iter().map(payroll_to_row).collect()
}

/// Sum of the `hours` column, for report footers.
pub(crate) fn total_hours(rows: &[PayrollExport]) -> f64 {
    rows.iter()
        .filter_map(|r| r.hours.parse::<f64>().ok())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn entry(time_out: Option<DateTime<Utc>>, worked: Option<f64>, manual: Option<f64>) -> TimeEntry {
        TimeEntry {
            id: 1,
            firefighter_id: 1,
            category_id: 1,
            category: "Training".into(),
            time_in: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            time_out,
            hours_worked: worked,
            manual_added_hours: manual,
            auto_checkout: false,
            auto_checkout_note: None,
        }
    }

    #[test]
    fn open_entry_has_no_time_out_and_zero_hours() {
        let row = PayrollExport::from_entry(&entry(None, None, None), "F1", "Alice");
        assert_eq!(row.time_out, "");
        assert_eq!(row.hours, "0.00");
        assert!(!row.manual);
    }

    #[test]
    fn manual_hours_take_precedence() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let e = entry(Some(t + Duration::hours(2)), Some(2.0), Some(2.0));
        let row = PayrollExport::from_entry(&e, "F1", "Alice");

        assert_eq!(row.hours, "2.00");
        assert!(row.manual);
        assert_eq!(payroll_to_row(&row)[7], "yes");
        assert_eq!(total_hours(&[row.clone(), row]), 4.0);
    }
}
