//! Error types for mapping configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading alias tables.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to read alias tables {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid alias tables: {message}")]
    InvalidAliases { message: String },
}
