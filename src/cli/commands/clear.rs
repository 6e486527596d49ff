use crate::cli::commands::open_db;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::ledger::TimeLedger;
use crate::errors::AppResult;
use crate::ui::messages::{confirm, info, success, warning};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Clear { yes } = cmd {
        if !*yes {
            warning("Delete ALL time log entries and reset every firefighter's total?");
            if !confirm("Confirm") {
                info("Operation cancelled.");
                return Ok(());
            }
        }

        let mut pool = open_db(cfg)?;
        let removed = TimeLedger::clear_all(&mut pool)?;
        success(format!(
            "Cleared {removed} time log entries; all totals reset to 0"
        ));
    }
    Ok(())
}
