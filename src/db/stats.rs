use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use crate::utils::time::{format_hours, format_local, from_db};
use std::fs;

/// Counters shown by `db --info`.
#[derive(Debug, Clone, PartialEq)]
pub struct DbStats {
    pub firefighters: i64,
    pub categories: i64,
    pub entries: i64,
    pub open_entries: i64,
    pub auto_checkouts: i64,
    pub manual_entries: i64,
    pub total_hours: f64,
    pub first_time_in: Option<String>,
    pub last_time_in: Option<String>,
}

fn count(pool: &DbPool, sql: &str) -> AppResult<i64> {
    Ok(pool.conn.query_row(sql, [], |row| row.get(0))?)
}

pub fn collect(pool: &DbPool) -> AppResult<DbStats> {
    let total_hours: f64 = pool.conn.query_row(
        "SELECT COALESCE(SUM(total_hours), 0) FROM firefighters",
        [],
        |row| row.get(0),
    )?;

    let first_time_in: Option<String> =
        pool.conn
            .query_row("SELECT MIN(time_in) FROM time_logs", [], |row| row.get(0))?;
    let last_time_in: Option<String> =
        pool.conn
            .query_row("SELECT MAX(time_in) FROM time_logs", [], |row| row.get(0))?;

    Ok(DbStats {
        firefighters: count(pool, "SELECT COUNT(*) FROM firefighters")?,
        categories: count(pool, "SELECT COUNT(*) FROM activity_categories")?,
        entries: count(pool, "SELECT COUNT(*) FROM time_logs")?,
        open_entries: count(pool, "SELECT COUNT(*) FROM time_logs WHERE time_out IS NULL")?,
        auto_checkouts: count(pool, "SELECT COUNT(*) FROM time_logs WHERE auto_checkout = 1")?,
        manual_entries: count(
            pool,
            "SELECT COUNT(*) FROM time_logs WHERE manual_added_hours IS NOT NULL",
        )?,
        total_hours,
        first_time_in,
        last_time_in,
    })
}

pub fn print_db_info(pool: &DbPool, db_path: &str) -> AppResult<()> {
    let stats = collect(pool)?;

    println!();

    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    println!(
        "{}• Firefighters:{} {}{}{}",
        CYAN, RESET, GREEN, stats.firefighters, RESET
    );
    println!(
        "{}• Activity categories:{} {}",
        CYAN, RESET, stats.categories
    );
    println!(
        "{}• Time log entries:{} {}{}{} ({} open, {} manual, {} auto checked out)",
        CYAN,
        RESET,
        GREEN,
        stats.entries,
        RESET,
        stats.open_entries,
        stats.manual_entries,
        stats.auto_checkouts
    );
    println!(
        "{}• Total hours on record:{} {}",
        CYAN,
        RESET,
        format_hours(stats.total_hours)
    );

    let fmt = |raw: &Option<String>| match raw.as_deref().and_then(from_db) {
        Some(dt) => format_local(&dt),
        None => format!("{GREY}--{RESET}"),
    };

    println!("{}• Date range:{}", CYAN, RESET);
    println!("    from: {}", fmt(&stats.first_time_in));
    println!("    to:   {}", fmt(&stats.last_time_in));

    println!();
    Ok(())
}
