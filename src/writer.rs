use std::path::Path;
use std::time::Instant;

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use tracing::info;

use crate::error::Result;
use crate::records::AggregatedRow;
use crate::schema::OUTPUT_HEADERS;

pub const SHEET_NAME: &str = "Sheet1";

fn build_workbook(rows: &[AggregatedRow]) -> std::result::Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, title) in OUTPUT_HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, &header_format)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let sheet_row = (index + 1) as u32;
        worksheet.write_string(sheet_row, 0, row.area_name.as_str())?;
        worksheet.write_number(sheet_row, 1, row.total_squirrels as f64)?;
        worksheet.write_number(sheet_row, 2, row.total_observation_time)?;
    }

    worksheet.autofit();
    Ok(workbook)
}

/// Writes `rows` as a single-sheet workbook at `path`.
pub fn write_workbook(path: &Path, rows: &[AggregatedRow]) -> Result<()> {
    let start_time = Instant::now();

    let mut workbook = build_workbook(rows)?;
    workbook.save(path)?;

    info!(
        action = "complete",
        component = "xlsx_writer",
        path = ?path,
        row_count = rows.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Workbook written"
    );
    Ok(())
}

pub fn workbook_bytes(rows: &[AggregatedRow]) -> Result<Vec<u8>> {
    let mut workbook = build_workbook(rows)?;
    Ok(workbook.save_to_buffer()?)
}
