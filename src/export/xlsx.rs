use crate::errors::{AppError, AppResult};
use crate::export::excel_date::parse_to_excel_date;
use crate::export::model::{get_headers, payroll_to_row, total_hours};
use crate::export::{PayrollExport, notify_export_success};
use crate::ui::messages::info;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatPattern, Workbook, Worksheet};
use std::path::Path;
use unicode_width::UnicodeWidthStr;

/// Columns that must stay text even when they look numeric.
const TEXT_COLUMNS: [usize; 3] = [0, 1, 5];
const HOURS_COLUMN: usize = 6;

/// Styled workbook: colored header, banded rows, auto-sized columns and a
/// total-hours line under the table.
pub(crate) fn export_xlsx(rows: &[PayrollExport], path: &Path) -> AppResult<()> {
    info(format!("Exporting to XLSX: {}", path.display()));

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Payroll").map_err(to_app_error)?;

    let headers = get_headers();

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0xFFFFFF))
        .set_background_color(Color::RGB(0xB22222))
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);

    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_with_format(0, col as u16, *header, &header_format)
            .map_err(to_app_error)?;
    }

    worksheet.set_freeze_panes(1, 0).map_err(to_app_error)?;

    let mut col_widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();

    let band1 = Color::RGB(0xFBEAEA);
    let band2 = Color::RGB(0xFFFFFF);

    for (row_index, item) in rows.iter().enumerate() {
        let row = (row_index + 1) as u32;
        let band = if row_index % 2 == 0 { band1 } else { band2 };

        for (col, value) in payroll_to_row(item).iter().enumerate() {
            write_cell(worksheet, row, col, value, band)?;
            col_widths[col] = col_widths[col].max(value.width());
        }
    }

    // totals line
    let total_row = (rows.len() + 1) as u32;
    let bold = Format::new().set_bold().set_border_top(FormatBorder::Thin);
    worksheet
        .write_with_format(total_row, (HOURS_COLUMN - 1) as u16, "Total", &bold)
        .map_err(to_app_error)?;
    worksheet
        .write_with_format(
            total_row,
            HOURS_COLUMN as u16,
            total_hours(rows),
            &bold.clone().set_num_format("0.00"),
        )
        .map_err(to_app_error)?;

    for (c, w) in col_widths.iter().enumerate() {
        worksheet
            .set_column_width(c as u16, *w as f64 + 2.0)
            .map_err(to_app_error)?;
    }

    workbook.save(path).map_err(to_app_error)?;

    notify_export_success("XLSX", path);
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: usize,
    s: &str,
    bg: Color,
) -> AppResult<()> {
    let base = Format::new()
        .set_background_color(bg)
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);
    let c = col as u16;

    if !TEXT_COLUMNS.contains(&col) {
        if let Some((num_format, serial)) = parse_to_excel_date(s) {
            worksheet
                .write_with_format(row, c, serial, &base.set_num_format(num_format))
                .map_err(to_app_error)?;
            return Ok(());
        }

        if col == HOURS_COLUMN {
            if let Ok(num) = s.parse::<f64>() {
                let fmt = base.set_align(FormatAlign::Right).set_num_format("0.00");
                worksheet
                    .write_with_format(row, c, num, &fmt)
                    .map_err(to_app_error)?;
                return Ok(());
            }
        }
    }

    worksheet
        .write_with_format(row, c, s, &base)
        .map_err(to_app_error)?;
    Ok(())
}

fn to_app_error<E: std::fmt::Display>(e: E) -> AppError {
    AppError::Export(e.to_string())
}
