use crate::cli::commands::open_db;
use crate::config::Config;
use crate::core::ledger::TimeLedger;
use crate::errors::AppResult;
use crate::ui::messages::info;
use crate::utils::table::Table;
use crate::utils::time::format_hours;

pub fn handle(cfg: &Config) -> AppResult<()> {
    let pool = open_db(cfg)?;
    let rows = TimeLedger::leaderboard(&pool)?;

    if rows.is_empty() {
        info("No firefighters registered.");
        return Ok(());
    }

    let mut table = Table::new(&["Rank", "Number", "Name", "Total hours"]);
    for r in rows {
        table.add_row(vec![
            r.rank.to_string(),
            r.fireman_number,
            r.full_name,
            format_hours(r.total_hours),
        ]);
    }

    println!("🏆 Leaderboard:\n");
    print!("{}", table.render());
    Ok(())
}
