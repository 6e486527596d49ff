use crate::errors::{AppError, AppResult};
use crate::export::{PayrollExport, notify_export_success};
use crate::ui::messages::info;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Pretty-printed JSON array of payroll rows.
pub(crate) fn export_json(rows: &[PayrollExport], path: &Path) -> AppResult<()> {
    info(format!("Exporting to JSON: {}", path.display()));

    let json_data = serde_json::to_string_pretty(rows)
        .map_err(|e| AppError::Export(format!("JSON serialization error: {e}")))?;

    let mut file = File::create(path)?;
    file.write_all(json_data.as_bytes())?;

    notify_export_success("JSON", path);
    Ok(())
}

/// CSV with a header row derived from the struct fields.
pub(crate) fn export_csv(rows: &[PayrollExport], path: &Path) -> AppResult<()> {
    info(format!("Exporting to CSV: {}", path.display()));

    let mut wtr = csv::Writer::from_path(path)
        .map_err(|e| AppError::Export(format!("CSV open error: {e}")))?;

    for item in rows {
        wtr.serialize(item)
            .map_err(|e| AppError::Export(format!("CSV write error: {e}")))?;
    }

    wtr.flush()?;

    notify_export_success("CSV", path);
    Ok(())
}
