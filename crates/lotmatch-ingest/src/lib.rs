//! Tabular input loading for lot matching.
//!
//! Specification tables and production datasets arrive as CSV files or
//! spreadsheets. This crate turns either into a [`RawTable`] of loosely
//! typed cells, with an explicit header row offset and sheet selection.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use lotmatch_ingest::{list_sheets, read_table};
//!
//! let sheets = list_sheets(Path::new("plant.xlsx"))?;
//! // The production header is the second sheet row.
//! let loaded = read_table(Path::new("plant.xlsx"), Some(&sheets[0]), 1)?;
//! ```

#![deny(unsafe_code)]

mod cache;
mod csv_table;
mod error;
mod table;
mod workbook;

use std::path::Path;

// === Error Types ===
pub use error::{IngestError, Result};

// === Tables ===
pub use table::{LoadedTable, RawTable};

// === Loaders ===
pub use cache::TableCache;
pub use csv_table::read_csv_table;
pub use workbook::{WORKBOOK_EXTENSIONS, list_workbook_sheets, read_workbook_table};

/// Reads a CSV file or one workbook sheet, dispatching on the extension.
///
/// `sheet` is ignored for CSV files, whose source label is the file stem.
pub fn read_table(path: &Path, sheet: Option<&str>, header_row: usize) -> Result<LoadedTable> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    match extension(path).as_str() {
        "csv" | "txt" => Ok(LoadedTable {
            source_label: file_stem(path),
            table: read_csv_table(path, header_row)?,
        }),
        ext if WORKBOOK_EXTENSIONS.contains(&ext) => read_workbook_table(path, sheet, header_row),
        ext => Err(IngestError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension: ext.to_string(),
        }),
    }
}

/// Sheet names of a workbook; a CSV file has a single sheet named after its stem.
pub fn list_sheets(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    match extension(path).as_str() {
        "csv" | "txt" => Ok(vec![file_stem(path)]),
        ext if WORKBOOK_EXTENSIONS.contains(&ext) => list_workbook_sheets(path),
        ext => Err(IngestError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension: ext.to_string(),
        }),
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
