//! Time ledger: clock-in/out state, the append-only entry log and the cached
//! `total_hours` of every firefighter.
//!
//! Every mutation runs in a single transaction that also rewrites the owning
//! firefighter's total from the ledger sum, so the total always equals
//! `Σ COALESCE(manual_added_hours, hours_worked, 0)` once the call returns.

use crate::core::categories::resolve_or_create;
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::queries::{
    self, firefighter_by_id, is_constraint_violation, load_entry, open_entry_for, refresh_total,
};
use crate::errors::{AppError, AppResult};
use crate::models::firefighter::{Firefighter, HoursDrift, LeaderboardRow};
use crate::models::time_entry::{OpenSession, TimeEntry};
use crate::utils::time::{
    MAX_SPAN_HOURS, format_hours, from_db, hours_between, hours_to_duration, parse_local_date_time,
    to_db,
};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use rusqlite::{Connection, TransactionBehavior, params};
use std::collections::BTreeSet;

/// Result of a successful clock-out.
#[derive(Debug, Clone, PartialEq)]
pub struct ClockOut {
    pub entry_id: i64,
    pub activity: String,
    pub hours: f64,
    pub total_hours: f64,
}

pub struct TimeLedger;

/// Timestamps are stored with millisecond precision; compute on the stored value.
fn stored_precision(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.trunc_subsecs(3)
}

fn require_firefighter(conn: &Connection, firefighter_id: i64) -> AppResult<Firefighter> {
    firefighter_by_id(conn, firefighter_id)?
        .ok_or_else(|| AppError::UnknownFirefighter(format!("#{firefighter_id}")))
}

impl TimeLedger {
    /// Open a session for `firefighter_id` under `activity_label`.
    pub fn clock_in(
        pool: &mut DbPool,
        firefighter_id: i64,
        activity_label: &str,
        now: DateTime<Utc>,
    ) -> AppResult<i64> {
        let now = stored_precision(now);
        let tx = pool
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let ff = require_firefighter(&tx, firefighter_id)?;

        if open_entry_for(&tx, firefighter_id)?.is_some() {
            return Err(AppError::AlreadyClockedIn(ff.fireman_number));
        }

        let category_id = resolve_or_create(&tx, activity_label)?;

        match tx.execute(
            "INSERT INTO time_logs (firefighter_id, category_id, time_in)
             VALUES (?1, ?2, ?3)",
            params![firefighter_id, category_id, to_db(&now)],
        ) {
            Ok(_) => {}
            // the one-open-entry index caught a concurrent clock-in
            Err(e) if is_constraint_violation(&e) => {
                return Err(AppError::AlreadyClockedIn(ff.fireman_number));
            }
            Err(e) => return Err(e.into()),
        }

        let entry_id = tx.last_insert_rowid();
        tx.commit()?;

        tracing::info!(firefighter_id, entry_id, activity = activity_label.trim(), "clock in");
        audit(
            &pool.conn,
            "clock_in",
            &ff.fireman_number,
            &format!("{} clocked in for {}", ff.full_name, activity_label.trim()),
        );
        Ok(entry_id)
    }

    /// Close the open session of `firefighter_id` at `now`.
    pub fn clock_out(
        pool: &mut DbPool,
        firefighter_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<ClockOut> {
        let now = stored_precision(now);
        let tx = pool
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let ff = require_firefighter(&tx, firefighter_id)?;
        let entry = open_entry_for(&tx, firefighter_id)?
            .ok_or_else(|| AppError::NoOpenEntry(ff.fireman_number.clone()))?;

        // time_out must stay strictly after time_in even if the clock stepped back
        let time_out = if now > entry.time_in {
            now
        } else {
            entry.time_in + Duration::milliseconds(1)
        };
        let hours = hours_between(&entry.time_in, &time_out);

        tx.execute(
            "UPDATE time_logs SET time_out = ?1, hours_worked = ?2 WHERE id = ?3",
            params![to_db(&time_out), hours, entry.id],
        )?;
        let total_hours = refresh_total(&tx, firefighter_id)?;
        tx.commit()?;

        tracing::info!(firefighter_id, entry_id = entry.id, hours, total_hours, "clock out");
        audit(
            &pool.conn,
            "clock_out",
            &ff.fireman_number,
            &format!(
                "{} clocked out after {} hours",
                ff.full_name,
                format_hours(hours)
            ),
        );

        Ok(ClockOut {
            entry_id: entry.id,
            activity: entry.category,
            hours,
            total_hours,
        })
    }

    /// Backfill a closed session from paper records.
    ///
    /// `date` is `YYYY-MM-DD`, `time_in`/`time_out` are `HH:MM` in local time.
    /// The duration is stored as both `hours_worked` and `manual_added_hours`
    /// and counted once.
    pub fn add_manual_entry(
        pool: &mut DbPool,
        firefighter_id: i64,
        activity_label: &str,
        date: &str,
        time_in: &str,
        time_out: &str,
    ) -> AppResult<i64> {
        let start = parse_local_date_time(date, time_in)?;
        let end = parse_local_date_time(date, time_out)?;

        if end <= start {
            return Err(AppError::InvalidRange(format!(
                "time out {} must be after time in {} on {}",
                time_out.trim(),
                time_in.trim(),
                date.trim()
            )));
        }
        let hours = hours_between(&start, &end);

        let tx = pool
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let ff = require_firefighter(&tx, firefighter_id)?;
        let category_id = resolve_or_create(&tx, activity_label)?;

        tx.execute(
            "INSERT INTO time_logs
                 (firefighter_id, category_id, time_in, time_out, hours_worked, manual_added_hours)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![firefighter_id, category_id, to_db(&start), to_db(&end), hours],
        )?;
        let entry_id = tx.last_insert_rowid();
        let total_hours = refresh_total(&tx, firefighter_id)?;
        tx.commit()?;

        tracing::info!(firefighter_id, entry_id, hours, total_hours, "manual entry added");
        audit(
            &pool.conn,
            "manual",
            &ff.fireman_number,
            &format!(
                "Added {} hours of {} on {}",
                format_hours(hours),
                activity_label.trim(),
                date.trim()
            ),
        );
        Ok(entry_id)
    }

    /// Correct the times of an entry and re-derive its hours.
    ///
    /// `time_out = None` is only accepted for an entry that is still open.
    /// Manual entries keep `manual_added_hours` in step with `hours_worked`.
    pub fn edit_entry(
        pool: &mut DbPool,
        entry_id: i64,
        time_in: DateTime<Utc>,
        time_out: Option<DateTime<Utc>>,
    ) -> AppResult<TimeEntry> {
        let time_in = stored_precision(time_in);
        let time_out = time_out.map(stored_precision);

        let tx = pool
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let entry = load_entry(&tx, entry_id)?.ok_or(AppError::EntryNotFound(entry_id))?;

        match time_out {
            Some(out) => {
                if out <= time_in {
                    return Err(AppError::InvalidRange(format!(
                        "time out {} must be after time in {}",
                        to_db(&out),
                        to_db(&time_in)
                    )));
                }
                let hours = hours_between(&time_in, &out);
                let manual = entry.manual_added_hours.map(|_| hours);

                tx.execute(
                    "UPDATE time_logs
                     SET time_in = ?1, time_out = ?2, hours_worked = ?3, manual_added_hours = ?4
                     WHERE id = ?5",
                    params![to_db(&time_in), to_db(&out), hours, manual, entry_id],
                )?;
            }
            None => {
                if !entry.is_open() {
                    return Err(AppError::InvalidRange(format!(
                        "entry {entry_id} is closed and needs a time out"
                    )));
                }
                tx.execute(
                    "UPDATE time_logs SET time_in = ?1 WHERE id = ?2",
                    params![to_db(&time_in), entry_id],
                )?;
            }
        }

        refresh_total(&tx, entry.firefighter_id)?;
        let updated = load_entry(&tx, entry_id)?.ok_or(AppError::EntryNotFound(entry_id))?;
        tx.commit()?;

        tracing::info!(entry_id, hours = updated.effective_hours(), "entry edited");
        audit(
            &pool.conn,
            "edit",
            &format!("entry {entry_id}"),
            &format!("Entry now {} hours", format_hours(updated.effective_hours())),
        );
        Ok(updated)
    }

    /// Remove one entry and take its effective hours off the total.
    pub fn delete_entry(pool: &mut DbPool, entry_id: i64) -> AppResult<TimeEntry> {
        let tx = pool
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let entry = load_entry(&tx, entry_id)?.ok_or(AppError::EntryNotFound(entry_id))?;

        tx.execute("DELETE FROM time_logs WHERE id = ?1", [entry_id])?;
        let total_hours = refresh_total(&tx, entry.firefighter_id)?;
        tx.commit()?;

        tracing::info!(
            entry_id,
            firefighter_id = entry.firefighter_id,
            hours = entry.effective_hours(),
            total_hours,
            "entry deleted"
        );
        audit(
            &pool.conn,
            "del",
            &format!("entry {entry_id}"),
            &format!(
                "Deleted {} entry worth {} hours",
                entry.category,
                format_hours(entry.effective_hours())
            ),
        );
        Ok(entry)
    }

    /// Delete every entry and zero every total, atomically.
    /// Returns the number of entries removed.
    pub fn clear_all(pool: &mut DbPool) -> AppResult<usize> {
        let tx = pool
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let removed = tx.execute("DELETE FROM time_logs", [])?;
        tx.execute(
            "UPDATE firefighters SET total_hours = 0, updated_at = CURRENT_TIMESTAMP",
            [],
        )?;
        tx.commit()?;

        tracing::warn!(removed, "all time logs cleared");
        audit(
            &pool.conn,
            "clear",
            "time_logs",
            &format!("Cleared {removed} time log(s) and reset all totals"),
        );
        Ok(removed)
    }

    /// Close open sessions whose `time_in` is more than `threshold_hours` ago.
    ///
    /// Each one is closed at `time_in + credit`, where the credit is the
    /// category's default duration (capped at the threshold) or
    /// `credited_hours`, never the real elapsed time. Already closed entries
    /// are never touched, so repeated runs are harmless.
    pub fn auto_checkout_stale_sessions(
        pool: &mut DbPool,
        now: DateTime<Utc>,
        threshold_hours: f64,
        credited_hours: f64,
    ) -> AppResult<usize> {
        if !(threshold_hours.is_finite() && (0.0..=MAX_SPAN_HOURS).contains(&threshold_hours)) {
            return Err(AppError::InvalidRange(format!(
                "stale threshold must be between 0 and {MAX_SPAN_HOURS} hours, got {threshold_hours}"
            )));
        }
        if !(credited_hours.is_finite() && credited_hours > 0.0 && credited_hours <= threshold_hours)
        {
            return Err(AppError::InvalidRange(format!(
                "credited hours must be > 0 and <= {threshold_hours}, got {credited_hours}"
            )));
        }

        let cutoff = stored_precision(now)
            .checked_sub_signed(hours_to_duration(threshold_hours)?)
            .ok_or_else(|| {
                AppError::InvalidRange(format!("{threshold_hours}h before {now} is out of range"))
            })?;
        let cutoff = to_db(&cutoff);

        // cheap path: one filtered read, no write lock
        let stale_count: i64 = pool.conn.query_row(
            "SELECT COUNT(*) FROM time_logs WHERE time_out IS NULL AND time_in < ?1",
            [&cutoff],
            |row| row.get(0),
        )?;
        if stale_count == 0 {
            return Ok(0);
        }

        let tx = pool
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let stale: Vec<(i64, i64, String, Option<f64>)> = {
            let mut stmt = tx.prepare(
                "SELECT tl.id, tl.firefighter_id, tl.time_in, ac.default_hours
                 FROM time_logs tl
                 JOIN activity_categories ac ON ac.id = tl.category_id
                 WHERE tl.time_out IS NULL AND tl.time_in < ?1
                 ORDER BY tl.time_in ASC",
            )?;
            let rows = stmt.query_map([&cutoff], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?;

            let mut v = Vec::new();
            for r in rows {
                v.push(r?);
            }
            v
        };

        let mut closed = 0;
        let mut touched = BTreeSet::new();

        for (entry_id, firefighter_id, raw_in, default_hours) in stale {
            let time_in = from_db(&raw_in)
                .ok_or_else(|| AppError::InvalidTime(raw_in.clone()))?;

            let credit = default_hours
                .map(|d| d.min(threshold_hours))
                .unwrap_or(credited_hours);
            // a credit below one millisecond would land on time_in
            let time_out = time_in + hours_to_duration(credit)?.max(Duration::milliseconds(1));
            let hours = hours_between(&time_in, &time_out);
            let note = format!(
                "Auto checked out: open for more than {}h, credited {}h",
                threshold_hours,
                format_hours(hours)
            );

            closed += tx.execute(
                "UPDATE time_logs
                 SET time_out = ?1, hours_worked = ?2, auto_checkout = 1, auto_checkout_note = ?3
                 WHERE id = ?4 AND time_out IS NULL",
                params![to_db(&time_out), hours, note, entry_id],
            )?;
            touched.insert(firefighter_id);

            tracing::debug!(entry_id, firefighter_id, hours, "stale session closed");
        }

        for firefighter_id in &touched {
            refresh_total(&tx, *firefighter_id)?;
        }
        tx.commit()?;

        if closed > 0 {
            tracing::info!(closed, "stale sessions auto checked out");
            audit(
                &pool.conn,
                "auto_checkout",
                "time_logs",
                &format!("Auto checked out {closed} stale session(s)"),
            );
        }
        Ok(closed)
    }

    /// Rewrite every cached total from the ledger. Returns how many changed.
    pub fn recompute_all_totals(pool: &mut DbPool) -> AppResult<usize> {
        let tx = pool
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let changed = tx.execute(
            "UPDATE firefighters
             SET total_hours = (
                     SELECT COALESCE(SUM(COALESCE(manual_added_hours, hours_worked, 0)), 0)
                     FROM time_logs
                     WHERE time_logs.firefighter_id = firefighters.id
                 ),
                 updated_at = CURRENT_TIMESTAMP
             WHERE total_hours IS NOT (
                     SELECT COALESCE(SUM(COALESCE(manual_added_hours, hours_worked, 0)), 0)
                     FROM time_logs
                     WHERE time_logs.firefighter_id = firefighters.id
                 )",
            [],
        )?;
        tx.commit()?;

        if changed > 0 {
            tracing::warn!(changed, "cached totals repaired");
            audit(
                &pool.conn,
                "recompute",
                "firefighters",
                &format!("Recomputed total hours for {changed} firefighter(s)"),
            );
        }
        Ok(changed)
    }

    /// Firefighters whose cached total differs from the ledger by more than `tolerance`.
    pub fn find_drift(pool: &DbPool, tolerance: f64) -> AppResult<Vec<HoursDrift>> {
        let mut stmt = pool.conn.prepare(
            "SELECT f.id, f.fireman_number, f.full_name,
                    COALESCE(f.total_hours, 0),
                    COALESCE(SUM(COALESCE(tl.manual_added_hours, tl.hours_worked, 0)), 0),
                    COUNT(tl.id)
             FROM firefighters f
             LEFT JOIN time_logs tl ON tl.firefighter_id = f.id
             GROUP BY f.id
             ORDER BY f.fireman_number",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(HoursDrift {
                firefighter_id: row.get(0)?,
                fireman_number: row.get(1)?,
                full_name: row.get(2)?,
                stored: row.get(3)?,
                calculated: row.get(4)?,
                log_count: row.get(5)?,
            })
        })?;

        let mut out = Vec::new();
        for r in rows {
            let d = r?;
            if d.difference().abs() > tolerance {
                out.push(d);
            }
        }
        Ok(out)
    }

    pub fn list_entries_for(pool: &DbPool, firefighter_id: i64) -> AppResult<Vec<TimeEntry>> {
        require_firefighter(&pool.conn, firefighter_id)?;
        queries::list_entries_for(&pool.conn, firefighter_id)
    }

    pub fn list_open_sessions(pool: &DbPool) -> AppResult<Vec<OpenSession>> {
        queries::list_open_sessions(&pool.conn)
    }

    pub fn leaderboard(pool: &DbPool) -> AppResult<Vec<LeaderboardRow>> {
        queries::leaderboard(&pool.conn)
    }
}
