use crate::errors::{AppError, AppResult};
use crate::models::category::ActivityCategory;
use crate::models::firefighter::{Firefighter, LeaderboardRow};
use crate::models::time_entry::{OpenSession, TimeEntry};
use crate::utils::time::from_db;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

/// Columns shared by every time-log query; pair with [`map_entry`].
pub const ENTRY_COLUMNS: &str = "tl.id, tl.firefighter_id, tl.category_id, ac.name AS category,
     tl.time_in, tl.time_out, tl.hours_worked, tl.manual_added_hours,
     tl.auto_checkout, tl.auto_checkout_note";

fn timestamp(row: &Row, col: &str) -> Result<DateTime<Utc>> {
    let raw: String = row.get(col)?;
    from_db(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidTime(raw.clone())),
        )
    })
}

fn optional_timestamp(row: &Row, col: &str) -> Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<String>>(col)? {
        None => Ok(None),
        Some(_) => timestamp(row, col).map(Some),
    }
}

pub fn map_firefighter(row: &Row) -> Result<Firefighter> {
    Ok(Firefighter {
        id: row.get("id")?,
        fireman_number: row.get("fireman_number")?,
        full_name: row.get("full_name")?,
        total_hours: row.get::<_, Option<f64>>("total_hours")?.unwrap_or(0.0),
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn map_entry(row: &Row) -> Result<TimeEntry> {
    Ok(TimeEntry {
        id: row.get("id")?,
        firefighter_id: row.get("firefighter_id")?,
        category_id: row.get("category_id")?,
        category: row.get("category")?,
        time_in: timestamp(row, "time_in")?,
        time_out: optional_timestamp(row, "time_out")?,
        hours_worked: row.get("hours_worked")?,
        manual_added_hours: row.get("manual_added_hours")?,
        auto_checkout: row.get::<_, i64>("auto_checkout")? == 1,
        auto_checkout_note: row.get("auto_checkout_note")?,
    })
}

fn map_category(row: &Row) -> Result<ActivityCategory> {
    Ok(ActivityCategory {
        id: row.get("id")?,
        name: row.get("name")?,
        default_hours: row.get("default_hours")?,
        entry_count: row.get("entry_count")?,
    })
}

// ---------------------------
// Firefighters
// ---------------------------

pub fn firefighter_by_number(conn: &Connection, number: &str) -> AppResult<Option<Firefighter>> {
    let ff = conn
        .query_row(
            "SELECT * FROM firefighters WHERE fireman_number = ?1",
            [number.trim()],
            map_firefighter,
        )
        .optional()?;
    Ok(ff)
}

pub fn firefighter_by_id(conn: &Connection, id: i64) -> AppResult<Option<Firefighter>> {
    let ff = conn
        .query_row(
            "SELECT * FROM firefighters WHERE id = ?1",
            [id],
            map_firefighter,
        )
        .optional()?;
    Ok(ff)
}

pub fn firefighter_exists(conn: &Connection, id: i64) -> AppResult<bool> {
    let mut stmt = conn.prepare_cached("SELECT 1 FROM firefighters WHERE id = ?1")?;
    Ok(stmt.exists([id])?)
}

pub fn list_firefighters(conn: &Connection) -> AppResult<Vec<Firefighter>> {
    let mut stmt = conn.prepare("SELECT * FROM firefighters ORDER BY full_name, fireman_number")?;
    let rows = stmt.query_map([], map_firefighter)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Firefighters ordered by cached total, highest first.
pub fn leaderboard(conn: &Connection) -> AppResult<Vec<LeaderboardRow>> {
    let mut stmt = conn.prepare(
        "SELECT fireman_number, full_name, total_hours
         FROM firefighters
         ORDER BY total_hours DESC, full_name ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
        ))
    })?;

    let mut out = Vec::new();
    for (i, r) in rows.enumerate() {
        let (fireman_number, full_name, total_hours) = r?;
        out.push(LeaderboardRow {
            rank: i + 1,
            fireman_number,
            full_name,
            total_hours,
        });
    }
    Ok(out)
}

// ---------------------------
// Ledger rows
// ---------------------------

pub fn load_entry(conn: &Connection, id: i64) -> AppResult<Option<TimeEntry>> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS}
         FROM time_logs tl
         JOIN activity_categories ac ON ac.id = tl.category_id
         WHERE tl.id = ?1"
    );
    Ok(conn.query_row(&sql, [id], map_entry).optional()?)
}

pub fn open_entry_for(conn: &Connection, firefighter_id: i64) -> AppResult<Option<TimeEntry>> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS}
         FROM time_logs tl
         JOIN activity_categories ac ON ac.id = tl.category_id
         WHERE tl.firefighter_id = ?1 AND tl.time_out IS NULL
         ORDER BY tl.time_in DESC
         LIMIT 1"
    );
    Ok(conn.query_row(&sql, [firefighter_id], map_entry).optional()?)
}

/// All entries of one firefighter, newest first.
pub fn list_entries_for(conn: &Connection, firefighter_id: i64) -> AppResult<Vec<TimeEntry>> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS}
         FROM time_logs tl
         JOIN activity_categories ac ON ac.id = tl.category_id
         WHERE tl.firefighter_id = ?1
         ORDER BY tl.time_in DESC, tl.id DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([firefighter_id], map_entry)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Everyone currently clocked in, longest-running first.
pub fn list_open_sessions(conn: &Connection) -> AppResult<Vec<OpenSession>> {
    let mut stmt = conn.prepare(
        "SELECT tl.id, f.fireman_number, f.full_name, ac.name, tl.time_in
         FROM time_logs tl
         JOIN firefighters f ON f.id = tl.firefighter_id
         JOIN activity_categories ac ON ac.id = tl.category_id
         WHERE tl.time_out IS NULL
         ORDER BY tl.time_in ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(OpenSession {
            entry_id: row.get(0)?,
            fireman_number: row.get(1)?,
            full_name: row.get(2)?,
            activity: row.get(3)?,
            time_in: timestamp(row, "time_in")?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

// ---------------------------
// Totals
// ---------------------------

/// Σ effective hours over the ledger of one firefighter.
pub fn calculated_total(conn: &Connection, firefighter_id: i64) -> AppResult<f64> {
    let total: f64 = conn.query_row(
        "SELECT COALESCE(SUM(COALESCE(manual_added_hours, hours_worked, 0)), 0)
         FROM time_logs
         WHERE firefighter_id = ?1",
        [firefighter_id],
        |row| row.get(0),
    )?;
    Ok(total)
}

/// Overwrite the cached total of one firefighter with the ledger sum.
/// Must run inside the transaction that mutated the ledger.
pub fn refresh_total(conn: &Connection, firefighter_id: i64) -> AppResult<f64> {
    conn.execute(
        "UPDATE firefighters
         SET total_hours = (
                 SELECT COALESCE(SUM(COALESCE(manual_added_hours, hours_worked, 0)), 0)
                 FROM time_logs
                 WHERE time_logs.firefighter_id = firefighters.id
             ),
             updated_at = CURRENT_TIMESTAMP
         WHERE id = ?1",
        params![firefighter_id],
    )?;

    let total: f64 = conn.query_row(
        "SELECT total_hours FROM firefighters WHERE id = ?1",
        [firefighter_id],
        |row| row.get(0),
    )?;
    Ok(total)
}

// ---------------------------
// Categories
// ---------------------------

const CATEGORY_SELECT: &str = "SELECT ac.id, ac.name, ac.default_hours,
            (SELECT COUNT(*) FROM time_logs tl WHERE tl.category_id = ac.id) AS entry_count
     FROM activity_categories ac";

/// Case-insensitive lookup (the column is declared `COLLATE NOCASE`).
pub fn category_by_name(conn: &Connection, name: &str) -> AppResult<Option<ActivityCategory>> {
    let sql = format!("{CATEGORY_SELECT} WHERE ac.name = ?1");
    Ok(conn
        .query_row(&sql, [name.trim()], map_category)
        .optional()?)
}

pub fn list_categories(conn: &Connection) -> AppResult<Vec<ActivityCategory>> {
    let sql = format!("{CATEGORY_SELECT} ORDER BY ac.name");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], map_category)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// True for UNIQUE / CHECK / FOREIGN KEY failures.
pub fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
