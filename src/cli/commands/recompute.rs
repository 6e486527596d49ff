use crate::cli::commands::open_db;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::ledger::TimeLedger;
use crate::errors::AppResult;
use crate::ui::messages::{success, warning};
use crate::utils::colors::{RESET, color_for_drift};
use crate::utils::table::Table;
use crate::utils::time::format_hours;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Recompute { check } = cmd {
        let mut pool = open_db(cfg)?;
        let tolerance = cfg.drift_tolerance_hours;

        let drift = TimeLedger::find_drift(&pool, tolerance)?;

        if drift.is_empty() {
            success("All cached totals match the time logs.");
        } else {
            warning(format!(
                "{} firefighter(s) with a total off by more than {} hours:",
                drift.len(),
                tolerance
            ));

            let mut table = Table::new(&["Number", "Name", "Stored", "Calculated", "Diff", "Logs"]);
            for d in &drift {
                let diff = d.difference();
                table.add_row(vec![
                    d.fireman_number.clone(),
                    d.full_name.clone(),
                    format_hours(d.stored),
                    format_hours(d.calculated),
                    format!(
                        "{}{:+.2}{}",
                        color_for_drift(diff, tolerance),
                        diff,
                        RESET
                    ),
                    d.log_count.to_string(),
                ]);
            }
            print!("{}", table.render());
        }

        if !*check {
            let changed = TimeLedger::recompute_all_totals(&mut pool)?;
            success(format!("Recomputed totals: {changed} firefighter(s) updated"));
        }
    }
    Ok(())
}
