//! Spreadsheet loading (xlsx, xlsm, xlsb, xls, ods) through calamine.

use std::path::Path;

use calamine::{Data, DataType, Range, Reader, open_workbook_auto};
use lotmatch_model::CellValue;
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::table::{LoadedTable, RawTable};

/// Extensions handled by [`read_workbook_table`].
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Sheet names in workbook order.
pub fn list_workbook_sheets(path: &Path) -> Result<Vec<String>> {
    let workbook = open_workbook_auto(path).map_err(|err| workbook_error(path, &err))?;
    Ok(workbook.sheet_names())
}

/// Reads one sheet, defaulting to the first, with headers on `header_row`.
///
/// Rows are counted from the top of the sheet, skipping blank rows.
pub fn read_workbook_table(
    path: &Path,
    sheet: Option<&str>,
    header_row: usize,
) -> Result<LoadedTable> {
    let mut workbook = open_workbook_auto(path).map_err(|err| workbook_error(path, &err))?;
    let available = workbook.sheet_names();
    let sheet_name = match sheet {
        Some(requested) => available
            .iter()
            .find(|name| name.as_str() == requested)
            .cloned()
            .ok_or_else(|| IngestError::SheetNotFound {
                path: path.to_path_buf(),
                sheet: requested.to_string(),
                available: available.clone(),
            })?,
        None => available
            .first()
            .cloned()
            .ok_or_else(|| IngestError::NoSheets {
                path: path.to_path_buf(),
            })?,
    };
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|err| workbook_error(path, &err))?;
    let table = RawTable::from_rows(path, sheet_rows(&range), header_row)?;
    debug!(
        path = %path.display(),
        sheet = %sheet_name,
        columns = table.headers.len(),
        rows = table.len(),
        "read workbook sheet"
    );
    Ok(LoadedTable {
        source_label: sheet_name,
        table,
    })
}

/// Rows of a used range, with columns re-anchored at column A.
///
/// Blank rows above the used range are not materialized; they would be
/// skipped by [`RawTable::from_rows`] anyway.
fn sheet_rows(range: &Range<Data>) -> Vec<Vec<CellValue>> {
    let column_offset = range.start().map_or(0, |(_, column)| column as usize);
    range
        .rows()
        .map(|row| {
            let mut cells = vec![CellValue::Empty; column_offset];
            cells.extend(row.iter().map(cell_value));
            cells
        })
        .collect()
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::Int(value) => CellValue::Number(*value as f64),
        Data::Float(value) => CellValue::Number(*value),
        Data::String(text) => CellValue::from_text(text),
        Data::Bool(flag) => CellValue::Text(flag.to_string()),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::from_text(&cell.to_string())),
        Data::DurationIso(text) => CellValue::from_text(text),
    }
}

fn workbook_error(path: &Path, err: &impl std::fmt::Display) -> IngestError {
    IngestError::Workbook {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
