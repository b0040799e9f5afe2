//! Delimited-text loading.

use std::path::Path;

use csv::ReaderBuilder;
use lotmatch_model::CellValue;
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::table::RawTable;

/// Reads a CSV file, taking headers from `header_row` (zero-based).
///
/// Blank records are not counted, the same rule workbook sheets follow.
/// Cells arrive as text; numeric coercion happens downstream.
pub fn read_csv_table(path: &Path, header_row: usize) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|err| csv_error(path, &err))?;
    let mut raw_rows: Vec<Vec<CellValue>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| csv_error(path, &err))?;
        raw_rows.push(record.iter().map(CellValue::from_text).collect());
    }
    let table = RawTable::from_rows(path, raw_rows, header_row)?;
    debug!(
        path = %path.display(),
        columns = table.headers.len(),
        rows = table.len(),
        "read csv table"
    );
    Ok(table)
}

fn csv_error(path: &Path, err: &csv::Error) -> IngestError {
    IngestError::CsvParse {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
