//! Firefighter directory: registration, lookup, edits and removal.

use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::queries::{
    firefighter_by_id, firefighter_by_number, is_constraint_violation, list_firefighters,
};
use crate::errors::{AppError, AppResult};
use crate::models::firefighter::Firefighter;
use rusqlite::params;

pub struct Roster;

fn clean(field: &str, value: &str) -> AppResult<String> {
    let v = value.trim();
    if v.is_empty() {
        return Err(AppError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(v.to_string())
}

impl Roster {
    /// Register a new firefighter with a zero total. Returns the new id.
    pub fn register(pool: &mut DbPool, number: &str, full_name: &str) -> AppResult<i64> {
        let number = clean("firefighter number", number)?;
        let full_name = clean("full name", full_name)?;

        let inserted = pool.conn.execute(
            "INSERT INTO firefighters (fireman_number, full_name, total_hours)
             VALUES (?1, ?2, 0)",
            params![number, full_name],
        );

        match inserted {
            Ok(_) => {}
            Err(e) if is_constraint_violation(&e) => {
                return Err(AppError::DuplicateFirefighter(number));
            }
            Err(e) => return Err(e.into()),
        }

        let id = pool.conn.last_insert_rowid();
        tracing::info!(firefighter_id = id, number = %number, "firefighter registered");
        audit(&pool.conn, "register", &number, &format!("Registered {full_name}"));
        Ok(id)
    }

    /// Look up by external number, failing with `UnknownFirefighter`.
    pub fn require(pool: &DbPool, number: &str) -> AppResult<Firefighter> {
        firefighter_by_number(&pool.conn, number)?
            .ok_or_else(|| AppError::UnknownFirefighter(number.trim().to_string()))
    }

    pub fn require_id(pool: &DbPool, id: i64) -> AppResult<Firefighter> {
        firefighter_by_id(&pool.conn, id)?
            .ok_or_else(|| AppError::UnknownFirefighter(format!("#{id}")))
    }

    /// Change number and/or name of an existing firefighter.
    pub fn update(
        pool: &mut DbPool,
        number: &str,
        new_number: Option<&str>,
        new_full_name: Option<&str>,
    ) -> AppResult<Firefighter> {
        let current = Self::require(pool, number)?;

        let new_number = match new_number {
            Some(n) => clean("firefighter number", n)?,
            None => current.fireman_number.clone(),
        };
        let new_full_name = match new_full_name {
            Some(n) => clean("full name", n)?,
            None => current.full_name.clone(),
        };

        let updated = pool.conn.execute(
            "UPDATE firefighters
             SET fireman_number = ?1, full_name = ?2, updated_at = CURRENT_TIMESTAMP
             WHERE id = ?3",
            params![new_number, new_full_name, current.id],
        );

        match updated {
            Ok(_) => {}
            Err(e) if is_constraint_violation(&e) => {
                return Err(AppError::DuplicateFirefighter(new_number));
            }
            Err(e) => return Err(e.into()),
        }

        audit(
            &pool.conn,
            "edit",
            &current.fireman_number,
            &format!("Now #{new_number} {new_full_name}"),
        );

        Self::require_id(pool, current.id)
    }

    /// Remove a firefighter; the ledger cascade removes their entries.
    /// Returns the deleted record and how many entries went with it.
    pub fn delete(pool: &mut DbPool, number: &str) -> AppResult<(Firefighter, i64)> {
        let ff = Self::require(pool, number)?;

        let tx = pool.conn.transaction()?;
        let entries: i64 = tx.query_row(
            "SELECT COUNT(*) FROM time_logs WHERE firefighter_id = ?1",
            [ff.id],
            |row| row.get(0),
        )?;
        tx.execute("DELETE FROM firefighters WHERE id = ?1", [ff.id])?;
        tx.commit()?;

        tracing::info!(firefighter_id = ff.id, entries, "firefighter deleted");
        audit(
            &pool.conn,
            "del",
            &ff.fireman_number,
            &format!("Deleted {} with {} time log(s)", ff.full_name, entries),
        );
        Ok((ff, entries))
    }

    pub fn list(pool: &DbPool) -> AppResult<Vec<Firefighter>> {
        list_firefighters(&pool.conn)
    }
}
