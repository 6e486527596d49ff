use serde::Serialize;

/// Identity record with the cached running total of credited hours.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Firefighter {
    pub id: i64,
    pub fireman_number: String, // ⇔ firefighters.fireman_number (UNIQUE)
    pub full_name: String,
    pub total_hours: f64, // ⇔ cached Σ effective hours of time_logs
    pub created_at: String,
    pub updated_at: String,
}

/// One row of the hours leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub fireman_number: String,
    pub full_name: String,
    pub total_hours: f64,
}

/// Divergence between the cached total and the sum over the ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoursDrift {
    pub firefighter_id: i64,
    pub fireman_number: String,
    pub full_name: String,
    pub stored: f64,
    pub calculated: f64,
    pub log_count: i64,
}

impl HoursDrift {
    pub fn difference(&self) -> f64 {
        self.stored - self.calculated
    }
}
