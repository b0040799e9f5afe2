//! Errors that abort a matching run.
//!
//! Cell-level problems never surface here: unparseable numbers and dates
//! become `None` and show up as statuses in the report instead.

use std::path::PathBuf;

use lotmatch_ingest::IngestError;
use lotmatch_map::MapError;
use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Required columns could not be located in an input table.
    #[error("{table} table is missing required columns: {}", .missing.join(", "))]
    Configuration {
        table: &'static str,
        missing: Vec<&'static str>,
    },

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Aliases(#[from] MapError),

    /// Frame operations during imputation.
    #[error("reading frame: {0}")]
    Frame(#[from] PolarsError),

    /// A match options file could not be read or parsed.
    #[error("invalid match options {path}: {message}")]
    Options { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
