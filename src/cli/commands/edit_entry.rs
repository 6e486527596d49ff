use crate::cli::commands::open_db;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::ledger::TimeLedger;
use crate::errors::AppResult;
use crate::ui::messages::success;
use crate::utils::time::{format_hours, parse_local_datetime};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::EditEntry {
        id,
        time_in,
        time_out,
    } = cmd
    {
        let start = parse_local_datetime(time_in)?;
        let end = time_out.as_deref().map(parse_local_datetime).transpose()?;

        let mut pool = open_db(cfg)?;
        let entry = TimeLedger::edit_entry(&mut pool, *id, start, end)?;

        if entry.is_open() {
            success(format!("Entry {} now starts at {}", entry.id, time_in.trim()));
        } else {
            success(format!(
                "Entry {} updated: {} hours",
                entry.id,
                format_hours(entry.effective_hours())
            ));
        }
    }
    Ok(())
}
