use crate::cli::commands::open_db;
use crate::cli::parser::{Commands, FirefighterAction};
use crate::config::Config;
use crate::core::ledger::TimeLedger;
use crate::core::roster::Roster;
use crate::errors::AppResult;
use crate::models::time_entry::TimeEntry;
use crate::ui::messages::{confirm, info, success, warning};
use crate::utils::colors::colorize_optional;
use crate::utils::table::Table;
use crate::utils::time::{format_hours, format_local};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Firefighter { action } = cmd else {
        return Ok(());
    };

    let mut pool = open_db(cfg)?;

    match action {
        FirefighterAction::Edit {
            number,
            new_number,
            new_name,
        } => {
            if new_number.is_none() && new_name.is_none() {
                info("Nothing to change: use --number and/or --name.");
                return Ok(());
            }
            let ff = Roster::update(&mut pool, number, new_number.as_deref(), new_name.as_deref())?;
            success(format!("Updated: #{} {}", ff.fireman_number, ff.full_name));
        }

        FirefighterAction::Delete { number, yes } => {
            let ff = Roster::require(&pool, number)?;
            let prompt = format!(
                "Delete #{} {} and ALL of their time log entries? This cannot be undone.",
                ff.fireman_number, ff.full_name
            );

            if !*yes {
                warning(&prompt);
                if !confirm("Proceed?") {
                    info("Operation cancelled.");
                    return Ok(());
                }
            }

            let (ff, entries) = Roster::delete(&mut pool, number)?;
            success(format!(
                "Deleted #{} {} ({} time log entries removed)",
                ff.fireman_number, ff.full_name, entries
            ));
        }

        FirefighterAction::List => {
            let all = Roster::list(&pool)?;
            if all.is_empty() {
                info("No firefighters registered.");
                return Ok(());
            }

            let mut table = Table::new(&["Number", "Name", "Total hours"]);
            for ff in &all {
                table.add_row(vec![
                    ff.fireman_number.clone(),
                    ff.full_name.clone(),
                    format_hours(ff.total_hours),
                ]);
            }
            print!("{}", table.render());
        }

        FirefighterAction::Show { number } => {
            let ff = Roster::require(&pool, number)?;
            let entries = TimeLedger::list_entries_for(&pool, ff.id)?;

            println!("#{} {}", ff.fireman_number, ff.full_name);
            println!("Total hours: {}\n", format_hours(ff.total_hours));

            if entries.is_empty() {
                info("No time log entries.");
            } else {
                print!("{}", entries_table(&entries).render());
            }
        }
    }

    Ok(())
}

pub(crate) fn entries_table(entries: &[TimeEntry]) -> Table {
    let mut table = Table::new(&["Id", "Activity", "In", "Out", "Hours", "Flags"]);

    for e in entries {
        let mut flags = Vec::new();
        if e.is_manual() {
            flags.push("manual");
        }
        if e.auto_checkout {
            flags.push("auto");
        }

        table.add_row(vec![
            e.id.to_string(),
            e.category.clone(),
            format_local(&e.time_in),
            colorize_optional(
                &e.time_out
                    .map(|t| format_local(&t))
                    .unwrap_or_else(|| "--".to_string()),
            ),
            if e.is_open() {
                colorize_optional("--")
            } else {
                format_hours(e.effective_hours())
            },
            flags.join(","),
        ]);
    }
    table
}
