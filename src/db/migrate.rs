use crate::errors::{AppError, AppResult};
use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the `log` table exists with the modern schema.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
    let exists: Option<String> = stmt.query_row([name], |row| row.get(0)).optional()?;
    Ok(exists.is_some())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{table}')"))?;
    let cols = stmt.query_map([], |row| row.get::<_, String>(1))?;

    for c in cols {
        if c? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn migration_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [version, message],
    )?;
    Ok(())
}

/// Create the core tables: firefighters, categories and the time ledger.
fn create_core_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS firefighters (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            fireman_number TEXT UNIQUE NOT NULL,
            full_name      TEXT NOT NULL,
            total_hours    REAL NOT NULL DEFAULT 0,
            created_at     TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at     TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS activity_categories (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            name          TEXT UNIQUE NOT NULL COLLATE NOCASE,
            default_hours REAL DEFAULT NULL CHECK(default_hours IS NULL OR default_hours > 0),
            created_at    TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS time_logs (
            id                 INTEGER PRIMARY KEY AUTOINCREMENT,
            firefighter_id     INTEGER NOT NULL,
            category_id        INTEGER NOT NULL,
            time_in            TEXT NOT NULL,
            time_out           TEXT,
            hours_worked       REAL,
            auto_checkout      INTEGER NOT NULL DEFAULT 0,
            auto_checkout_note TEXT,
            manual_added_hours REAL,
            created_at         TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK(time_out IS NULL OR time_out > time_in),
            FOREIGN KEY (firefighter_id) REFERENCES firefighters(id) ON DELETE CASCADE,
            FOREIGN KEY (category_id) REFERENCES activity_categories(id) ON DELETE RESTRICT
        );

        CREATE INDEX IF NOT EXISTS idx_time_logs_firefighter ON time_logs(firefighter_id, time_in);
        CREATE INDEX IF NOT EXISTS idx_time_logs_category ON time_logs(category_id);
        CREATE INDEX IF NOT EXISTS idx_time_logs_open ON time_logs(time_in) WHERE time_out IS NULL;
        "#,
    )?;
    Ok(())
}

/// Older databases were created without the sweep annotation column.
fn migrate_add_auto_checkout_note(conn: &Connection) -> Result<()> {
    if table_has_column(conn, "time_logs", "auto_checkout_note")? {
        return Ok(());
    }

    conn.execute("ALTER TABLE time_logs ADD COLUMN auto_checkout_note TEXT", [])?;
    tracing::info!("added auto_checkout_note column to time_logs");
    Ok(())
}

/// At most one open entry per firefighter, enforced by a partial unique index.
fn migrate_one_open_entry_guard(conn: &Connection) -> AppResult<()> {
    let version = "20250301_0001_one_open_entry_per_firefighter";

    if migration_applied(conn, version)? {
        return Ok(());
    }

    let duplicates: i64 = conn.query_row(
        "SELECT COUNT(*) FROM (
             SELECT firefighter_id FROM time_logs
             WHERE time_out IS NULL
             GROUP BY firefighter_id
             HAVING COUNT(*) > 1
         )",
        [],
        |row| row.get(0),
    )?;

    if duplicates > 0 {
        return Err(AppError::Migration(format!(
            "{duplicates} firefighter(s) have more than one open time log; close them before migrating"
        )));
    }

    conn.execute_batch(
        "CREATE UNIQUE INDEX IF NOT EXISTS uq_time_logs_one_open
             ON time_logs(firefighter_id) WHERE time_out IS NULL;",
    )?;

    mark_applied(conn, version, "Added one-open-entry guard to time_logs")?;

    tracing::info!(version, "migration applied: unique open entry per firefighter");
    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Invoked by db::init_db().
pub fn run_pending_migrations(conn: &Connection) -> AppResult<()> {
    ensure_log_table(conn)?;

    let ledger_exists = table_exists(conn, "time_logs")?;

    create_core_tables(conn)?;
    if !ledger_exists {
        tracing::info!("created firefighters, activity_categories and time_logs tables");
    }

    migrate_add_auto_checkout_note(conn)?;
    migrate_one_open_entry_guard(conn)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&conn).unwrap();
        run_pending_migrations(&conn).unwrap();

        let applied: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM log WHERE operation = 'migration_applied'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(applied, 1);
        assert!(table_has_column(&conn, "time_logs", "auto_checkout_note").unwrap());
    }

    #[test]
    fn legacy_ledger_gets_note_column() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE time_logs (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 firefighter_id INTEGER NOT NULL,
                 category_id INTEGER NOT NULL,
                 time_in TEXT NOT NULL,
                 time_out TEXT,
                 hours_worked REAL,
                 auto_checkout INTEGER NOT NULL DEFAULT 0,
                 manual_added_hours REAL,
                 created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
             );",
        )
        .unwrap();

        run_pending_migrations(&conn).unwrap();
        assert!(table_has_column(&conn, "time_logs", "auto_checkout_note").unwrap());
    }
}
