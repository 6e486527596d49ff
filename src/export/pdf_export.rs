use crate::errors::{AppError, AppResult};
use crate::export::model::{get_headers, payroll_to_table, total_hours};
use crate::export::pdf::PdfManager;
use crate::export::{PayrollExport, notify_export_success};
use crate::ui::messages::info;
use crate::utils::time::format_hours;
use std::path::Path;

pub(crate) fn export_pdf(rows: &[PayrollExport], path: &Path, title: &str) -> AppResult<()> {
    info(format!("Exporting to PDF: {}", path.display()));

    let headers = get_headers();
    let table = payroll_to_table(rows);
    let summary = format!(
        "{} entries, {} hours in total",
        rows.len(),
        format_hours(total_hours(rows))
    );

    let mut pdf = PdfManager::landscape();
    pdf.write_table(title, &headers, &table, Some(&summary));

    pdf.save(path)
        .map_err(|e| AppError::Export(format!("PDF export error: {e}")))?;

    notify_export_success("PDF", path);
    Ok(())
}
