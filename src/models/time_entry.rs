use chrono::{DateTime, Utc};
use serde::Serialize;

/// One ledger line: a clocked session or an administrator-entered block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeEntry {
    pub id: i64,
    pub firefighter_id: i64,
    pub category_id: i64,
    pub category: String,
    pub time_in: DateTime<Utc>,
    pub time_out: Option<DateTime<Utc>>, // None ⇔ currently clocked in
    pub hours_worked: Option<f64>,
    pub manual_added_hours: Option<f64>,
    pub auto_checkout: bool,
    pub auto_checkout_note: Option<String>,
}

impl TimeEntry {
    pub fn is_open(&self) -> bool {
        self.time_out.is_none()
    }

    pub fn is_manual(&self) -> bool {
        self.manual_added_hours.is_some()
    }

    /// Contribution of this entry to the firefighter total.
    pub fn effective_hours(&self) -> f64 {
        effective_hours(self.manual_added_hours, self.hours_worked)
    }
}

/// `manual_added_hours` if set, else `hours_worked`, else zero. Never the sum.
pub fn effective_hours(manual_added_hours: Option<f64>, hours_worked: Option<f64>) -> f64 {
    manual_added_hours.or(hours_worked).unwrap_or(0.0)
}

/// A firefighter currently clocked in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenSession {
    pub entry_id: i64,
    pub fireman_number: String,
    pub full_name: String,
    pub activity: String,
    pub time_in: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_hours_take_precedence_and_are_never_added() {
        assert_eq!(effective_hours(Some(2.0), Some(2.0)), 2.0);
        assert_eq!(effective_hours(Some(1.5), Some(3.0)), 1.5);
        assert_eq!(effective_hours(None, Some(3.0)), 3.0);
        assert_eq!(effective_hours(None, None), 0.0);
    }
}
