use crate::db::migrate::run_pending_migrations;
use crate::errors::AppResult;
use rusqlite::Connection;

/// Initialize the database.
/// Delegates all schema creation / upgrades to the migration engine.
pub fn init_db(conn: &Connection) -> AppResult<()> {
    run_pending_migrations(conn)?;
    Ok(())
}

/// Insert the given category names if missing; returns how many were added.
pub fn seed_categories(conn: &Connection, names: &[String]) -> AppResult<usize> {
    let mut stmt =
        conn.prepare_cached("INSERT OR IGNORE INTO activity_categories (name) VALUES (?1)")?;

    let mut added = 0;
    for name in names {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        added += stmt.execute([name])?;
    }
    Ok(added)
}
