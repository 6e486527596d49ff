use crate::cli::commands::open_db;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::ledger::TimeLedger;
use crate::core::roster::Roster;
use crate::errors::AppResult;
use crate::ui::messages::success;
use crate::utils::time::{format_hours, format_local};
use chrono::{DateTime, Utc};

pub fn handle(cmd: &Commands, cfg: &Config, now: DateTime<Utc>) -> AppResult<()> {
    match cmd {
        Commands::ClockIn { number, activity } => {
            let mut pool = open_db(cfg)?;
            let ff = Roster::require(&pool, number)?;

            let entry_id = TimeLedger::clock_in(&mut pool, ff.id, activity, now)?;
            success(format!(
                "{} clocked in for {} at {} (entry {})",
                ff.full_name,
                activity.trim(),
                format_local(&now),
                entry_id
            ));
        }

        Commands::ClockOut { number } => {
            let mut pool = open_db(cfg)?;
            let ff = Roster::require(&pool, number)?;

            let out = TimeLedger::clock_out(&mut pool, ff.id, now)?;
            success(format!(
                "{} clocked out of {}: {} hours (total {})",
                ff.full_name,
                out.activity,
                format_hours(out.hours),
                format_hours(out.total_hours)
            ));
        }

        _ => {}
    }
    Ok(())
}
