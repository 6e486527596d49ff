use crate::cli::commands::open_db;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::ledger::TimeLedger;
use crate::core::roster::Roster;
use crate::errors::AppResult;
use crate::ui::messages::success;
use crate::utils::time::format_hours;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Manual {
        number,
        activity,
        date,
        time_in,
        time_out,
    } = cmd
    {
        let mut pool = open_db(cfg)?;
        let ff = Roster::require(&pool, number)?;

        let entry_id =
            TimeLedger::add_manual_entry(&mut pool, ff.id, activity, date, time_in, time_out)?;
        let ff = Roster::require_id(&pool, ff.id)?;

        success(format!(
            "Manual entry {} added for {} on {} {}-{} (total {} hours)",
            entry_id,
            ff.full_name,
            date.trim(),
            time_in.trim(),
            time_out.trim(),
            format_hours(ff.total_hours)
        ));
    }
    Ok(())
}
