use serde::Serialize;

/// Named label for a time entry ("Training", "Work Night", ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityCategory {
    pub id: i64,
    pub name: String,
    /// Hours credited when a session of this category is auto-checked-out.
    pub default_hours: Option<f64>,
    pub entry_count: i64,
}
