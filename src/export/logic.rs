use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::queries::{ENTRY_COLUMNS, map_entry};
use crate::errors::{AppError, AppResult};
use crate::export::ExportFormat;
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::{export_csv, export_json};
use crate::export::model::PayrollExport;
use crate::export::pdf_export::export_pdf;
use crate::export::range::parse_range;
use crate::export::xlsx::export_xlsx;
use crate::ui::messages::warning;
use crate::utils::time::{local_to_utc, month_name, to_db};
use chrono::{NaiveDate, NaiveTime};
use rusqlite::{Row, params};
use std::path::Path;

pub struct ExportLogic;

impl ExportLogic {
    /// Write the payroll rows selected by `range` to `file`.
    ///
    /// `range` is `None`, `"all"`, or a `YYYY` / `YYYY-MM` / `YYYY-MM-DD`
    /// expression (optionally `A:B`), matched against the local date of
    /// `time_in`. Returns the number of rows written.
    pub fn export(
        pool: &DbPool,
        format: ExportFormat,
        file: &str,
        range: Option<&str>,
        force: bool,
    ) -> AppResult<usize> {
        let path = Path::new(file);

        if !path.is_absolute() {
            return Err(AppError::Export(format!(
                "output file path must be absolute: {file}"
            )));
        }

        let rows = Self::load(pool, range)?;

        if rows.is_empty() {
            warning("No time log entries found for the selected range.");
            return Ok(0);
        }

        ensure_writable(path, force)?;

        match format {
            ExportFormat::Csv => export_csv(&rows, path)?,
            ExportFormat::Json => export_json(&rows, path)?,
            ExportFormat::Xlsx => export_xlsx(&rows, path)?,
            ExportFormat::Pdf => export_pdf(&rows, path, &build_pdf_title(range))?,
        }

        tracing::info!(format = format.as_str(), rows = rows.len(), "payroll exported");
        audit(
            &pool.conn,
            "export",
            &path.to_string_lossy(),
            &format!("{} payroll rows as {}", rows.len(), format.as_str()),
        );

        Ok(rows.len())
    }

    /// Payroll rows for `range`, ordered by clock-in time.
    pub fn load(pool: &DbPool, range: Option<&str>) -> AppResult<Vec<PayrollExport>> {
        let bounds = match range.map(str::trim) {
            None => None,
            Some(r) if r.is_empty() || r.eq_ignore_ascii_case("all") => None,
            Some(r) => Some(parse_range(r)?),
        };

        let base = format!(
            "SELECT {ENTRY_COLUMNS}, f.fireman_number, f.full_name
             FROM time_logs tl
             JOIN activity_categories ac ON ac.id = tl.category_id
             JOIN firefighters f ON f.id = tl.firefighter_id"
        );
        let order = "ORDER BY tl.time_in ASC, f.fireman_number ASC";

        let mut out = Vec::new();

        match bounds {
            None => {
                let mut stmt = pool.conn.prepare(&format!("{base} {order}"))?;
                let rows = stmt.query_map([], map_row)?;
                for r in rows {
                    out.push(r?);
                }
            }
            Some((start, end)) => {
                let (from, to) = utc_window(start, end)?;
                let mut stmt = pool.conn.prepare(&format!(
                    "{base} WHERE tl.time_in >= ?1 AND tl.time_in < ?2 {order}"
                ))?;
                let rows = stmt.query_map(params![from, to], map_row)?;
                for r in rows {
                    out.push(r?);
                }
            }
        }

        Ok(out)
    }
}

/// Stored-timestamp window `[start 00:00, end+1 00:00)` in local time.
fn utc_window(start: NaiveDate, end: NaiveDate) -> AppResult<(String, String)> {
    let after_end = end
        .succ_opt()
        .ok_or_else(|| AppError::InvalidDate(end.to_string()))?;

    let from = local_to_utc(start.and_time(NaiveTime::MIN))?;
    let to = local_to_utc(after_end.and_time(NaiveTime::MIN))?;
    Ok((to_db(&from), to_db(&to)))
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<PayrollExport> {
    let entry = map_entry(row)?;
    let number: String = row.get("fireman_number")?;
    let name: String = row.get("full_name")?;
    Ok(PayrollExport::from_entry(&entry, &number, &name))
}

fn build_pdf_title(range: Option<&str>) -> String {
    let Some(r) = range.map(str::trim).filter(|r| !r.eq_ignore_ascii_case("all")) else {
        return "Payroll report".to_string();
    };

    if let Some((a, b)) = r.split_once(':') {
        return format!("Payroll report from {} to {}", a.trim(), b.trim());
    }

    match r.len() {
        4 => format!("Payroll report for year {r}"),
        7 => match (r.get(..4), r.get(5..).and_then(|m| m.parse::<u32>().ok())) {
            (Some(y), Some(m)) => format!("Payroll report for {} {}", month_name(m), y),
            _ => "Payroll report".to_string(),
        },
        10 => format!("Payroll report for {r}"),
        _ => "Payroll report".to_string(),
    }
}
