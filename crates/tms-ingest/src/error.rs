//! Error types for spreadsheet ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a results export.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Export file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exceeds the configured size limit.
    #[error("file {path} is too large ({size} bytes, limit {max_size} bytes)")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// File uses an encoding we cannot read.
    #[error("unsupported encoding {encoding} in {path}")]
    UnsupportedEncoding {
        path: PathBuf,
        encoding: &'static str,
    },

    // === Parsing Errors ===
    /// The tokenizer rejected the input.
    #[error("failed to parse spreadsheet: {message}")]
    Parse { message: String },

    /// Input contains no header row.
    #[error("spreadsheet has no header row")]
    MissingHeader,

    /// Same header name appears in two columns.
    #[error("duplicate header '{header}'")]
    DuplicateHeader { header: String },
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        Self::Parse {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
