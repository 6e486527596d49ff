//! Activity category directory.
//!
//! Names are unique case-insensitively. A category referenced by time log
//! entries cannot be deleted; merge it into another one instead.

use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::queries::{category_by_name, is_constraint_violation, list_categories};
use crate::errors::{AppError, AppResult};
use crate::models::category::ActivityCategory;
use rusqlite::{Connection, params};

pub struct Categories;

fn clean_name(name: &str) -> AppResult<&str> {
    let n = name.trim();
    if n.is_empty() {
        return Err(AppError::InvalidCategory("name must not be empty".into()));
    }
    Ok(n)
}

fn check_default_hours(hours: Option<f64>) -> AppResult<()> {
    match hours {
        Some(h) if !(h.is_finite() && h > 0.0) => Err(AppError::InvalidCategory(format!(
            "default hours must be positive, got {h}"
        ))),
        _ => Ok(()),
    }
}

/// Resolve a label to a category id, creating the category on first use.
pub fn resolve_or_create(conn: &Connection, label: &str) -> AppResult<i64> {
    let name = clean_name(label)?;

    conn.execute(
        "INSERT OR IGNORE INTO activity_categories (name) VALUES (?1)",
        [name],
    )?;

    let id: i64 = conn.query_row(
        "SELECT id FROM activity_categories WHERE name = ?1",
        [name],
        |row| row.get(0),
    )?;
    Ok(id)
}

impl Categories {
    pub fn create(pool: &mut DbPool, name: &str, default_hours: Option<f64>) -> AppResult<i64> {
        let name = clean_name(name)?;
        check_default_hours(default_hours)?;

        match pool.conn.execute(
            "INSERT INTO activity_categories (name, default_hours) VALUES (?1, ?2)",
            params![name, default_hours],
        ) {
            Ok(_) => {}
            Err(e) if is_constraint_violation(&e) => {
                return Err(AppError::DuplicateCategory(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        let id = pool.conn.last_insert_rowid();
        audit(&pool.conn, "category_add", name, "Category created");
        Ok(id)
    }

    pub fn require(pool: &DbPool, name: &str) -> AppResult<ActivityCategory> {
        category_by_name(&pool.conn, name)?
            .ok_or_else(|| AppError::UnknownCategory(name.trim().to_string()))
    }

    /// Delete an unused category; fails with `CategoryInUse` otherwise.
    pub fn delete(pool: &mut DbPool, name: &str) -> AppResult<ActivityCategory> {
        let tx = pool.conn.transaction()?;

        let cat = category_by_name(&tx, name)?
            .ok_or_else(|| AppError::UnknownCategory(name.trim().to_string()))?;

        if cat.entry_count > 0 {
            return Err(AppError::CategoryInUse(cat.name, cat.entry_count));
        }

        tx.execute("DELETE FROM activity_categories WHERE id = ?1", [cat.id])?;
        tx.commit()?;

        audit(&pool.conn, "category_del", &cat.name, "Category deleted");
        Ok(cat)
    }

    /// Move every entry of `from` to `into`, then delete `from`.
    /// Returns the number of entries moved.
    pub fn merge(pool: &mut DbPool, from: &str, into: &str) -> AppResult<usize> {
        let tx = pool.conn.transaction()?;

        let source = category_by_name(&tx, from)?
            .ok_or_else(|| AppError::UnknownCategory(from.trim().to_string()))?;
        let target = category_by_name(&tx, into)?
            .ok_or_else(|| AppError::UnknownCategory(into.trim().to_string()))?;

        if source.id == target.id {
            return Err(AppError::InvalidCategory(format!(
                "cannot merge '{}' into itself",
                source.name
            )));
        }

        let moved = tx.execute(
            "UPDATE time_logs SET category_id = ?1 WHERE category_id = ?2",
            params![target.id, source.id],
        )?;
        tx.execute("DELETE FROM activity_categories WHERE id = ?1", [source.id])?;
        tx.commit()?;

        tracing::info!(from = %source.name, into = %target.name, moved, "categories merged");
        audit(
            &pool.conn,
            "category_merge",
            &source.name,
            &format!("Merged into '{}' ({} entries)", target.name, moved),
        );
        Ok(moved)
    }

    pub fn set_default_hours(
        pool: &mut DbPool,
        name: &str,
        default_hours: Option<f64>,
    ) -> AppResult<ActivityCategory> {
        check_default_hours(default_hours)?;
        let cat = Self::require(pool, name)?;

        pool.conn.execute(
            "UPDATE activity_categories SET default_hours = ?1 WHERE id = ?2",
            params![default_hours, cat.id],
        )?;

        audit(
            &pool.conn,
            "category_edit",
            &cat.name,
            &match default_hours {
                Some(h) => format!("Default hours set to {h:.2}"),
                None => "Default hours cleared".to_string(),
            },
        );
        Self::require(pool, &cat.name)
    }

    pub fn list(pool: &DbPool) -> AppResult<Vec<ActivityCategory>> {
        list_categories(&pool.conn)
    }
}
