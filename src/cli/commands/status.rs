use crate::cli::commands::open_db;
use crate::config::Config;
use crate::core::ledger::TimeLedger;
use crate::errors::AppResult;
use crate::ui::messages::info;
use crate::utils::table::Table;
use crate::utils::time::{format_hours, format_local, hours_between};
use chrono::{DateTime, Utc};

/// Everyone currently clocked in, with time elapsed so far.
pub fn handle(cfg: &Config, now: DateTime<Utc>) -> AppResult<()> {
    let pool = open_db(cfg)?;
    let sessions = TimeLedger::list_open_sessions(&pool)?;

    if sessions.is_empty() {
        info("Nobody is clocked in.");
        return Ok(());
    }

    let mut table = Table::new(&["Entry", "Number", "Name", "Activity", "Since", "Elapsed"]);
    for s in &sessions {
        table.add_row(vec![
            s.entry_id.to_string(),
            s.fireman_number.clone(),
            s.full_name.clone(),
            s.activity.clone(),
            format_local(&s.time_in),
            format_hours(hours_between(&s.time_in, &now).max(0.0)),
        ]);
    }

    println!("🚒 Clocked in ({}):\n", sessions.len());
    print!("{}", table.render());
    Ok(())
}
