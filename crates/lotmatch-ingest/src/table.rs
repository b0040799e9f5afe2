//! In-memory tables shared by every loader.

use std::path::Path;

use lotmatch_model::CellValue;

use crate::error::{IngestError, Result};

/// A loaded table: headers from the chosen header row and the rows below it.
///
/// Every row has exactly `headers.len()` cells. Fully blank rows are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// Splits raw sheet rows at `header_row` (zero-based).
    ///
    /// Fully blank rows are dropped before the header row is counted, so a
    /// sheet and its CSV export agree on which row holds the headers. Rows
    /// above the header are discarded. Short rows are padded with
    /// [`CellValue::Empty`] and cells past the last header are dropped.
    pub fn from_rows(path: &Path, raw_rows: Vec<Vec<CellValue>>, header_row: usize) -> Result<Self> {
        let raw_rows: Vec<Vec<CellValue>> = raw_rows
            .into_iter()
            .filter(|row| !row.iter().all(CellValue::is_empty))
            .collect();
        let row_count = raw_rows.len();
        let mut rows_iter = raw_rows.into_iter().skip(header_row);
        let Some(header_cells) = rows_iter.next() else {
            return Err(IngestError::HeaderRowOutOfRange {
                path: path.to_path_buf(),
                header_row,
                row_count,
            });
        };
        let headers: Vec<String> = header_cells
            .iter()
            .map(|cell| normalize_header(&cell.as_text()))
            .collect();
        let width = headers.len();
        let rows = rows_iter
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        Ok(Self { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first header exactly equal to `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn cell(&self, row: usize, column: usize) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(EMPTY)
    }
}

/// A table together with the label of the sheet (or file) it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTable {
    /// Sheet name for workbooks, file stem for CSV files.
    pub source_label: String,
    pub table: RawTable,
}

/// Trims a header and collapses inner whitespace. Case and accents are kept.
fn normalize_header(raw: &str) -> String {
    raw.trim()
        .trim_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn text_row(cells: &[&str]) -> Vec<CellValue> {
        cells.iter().map(|cell| CellValue::from_text(cell)).collect()
    }

    #[test]
    fn splits_at_header_row_and_pads_rows() {
        let raw = vec![
            text_row(&["Plant report", "", ""]),
            text_row(&["Folio", " Estado ", "Humedad  %"]),
            text_row(&["F-1", "Retenido"]),
            text_row(&["", "", ""]),
            text_row(&["F-2", "Liberado", "11.2", "extra"]),
        ];
        let table = RawTable::from_rows(&PathBuf::from("t.csv"), raw, 1).expect("table");
        assert_eq!(table.headers, vec!["Folio", "Estado", "Humedad %"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, 2), &CellValue::Empty);
        assert_eq!(table.cell(1, 2), &CellValue::Text("11.2".to_string()));
        assert_eq!(table.rows[1].len(), 3);
    }

    #[test]
    fn blank_rows_are_not_counted_toward_the_header_row() {
        let raw = vec![
            text_row(&["", ""]),
            Vec::new(),
            text_row(&["Plant report", ""]),
            text_row(&["", ""]),
            text_row(&["Folio", "Estado"]),
            text_row(&["F-1", "Retenido"]),
        ];
        let table = RawTable::from_rows(&PathBuf::from("t.xlsx"), raw, 1).expect("table");
        assert_eq!(table.headers, vec!["Folio", "Estado"]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn header_row_past_end_is_an_error() {
        let raw = vec![text_row(&["Folio"])];
        let err = RawTable::from_rows(&PathBuf::from("t.csv"), raw, 1).unwrap_err();
        assert!(matches!(
            err,
            IngestError::HeaderRowOutOfRange {
                header_row: 1,
                row_count: 1,
                ..
            }
        ));
    }
}
