use crate::cli::commands::open_db;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::ledger::TimeLedger;
use crate::db::queries::load_entry;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{confirm, info, success, warning};
use crate::utils::time::{format_hours, format_local};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Del { id, yes } = cmd {
        let mut pool = open_db(cfg)?;

        let entry = load_entry(&pool.conn, *id)?.ok_or(AppError::EntryNotFound(*id))?;

        if !*yes {
            warning(format!(
                "Delete entry {} ({} from {}, {} hours)? This action is irreversible.",
                entry.id,
                entry.category,
                format_local(&entry.time_in),
                format_hours(entry.effective_hours())
            ));
            if !confirm("Confirm") {
                info("Operation cancelled.");
                return Ok(());
            }
        }

        let removed = TimeLedger::delete_entry(&mut pool, *id)?;
        success(format!(
            "Entry {} deleted ({} hours removed from the total)",
            removed.id,
            format_hours(removed.effective_hours())
        ));
    }

    Ok(())
}
