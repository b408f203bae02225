//! Error types for the domain model.

use thiserror::Error;

/// Errors raised while constructing model values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// An identifier was empty after trimming.
    #[error("invalid {kind} id: '{value}'")]
    InvalidId {
        /// Which identifier type was rejected.
        kind: &'static str,
        /// The rejected raw value.
        value: String,
    },

    /// The same header appeared twice in a parsed table.
    #[error("duplicate header '{header}' in spreadsheet")]
    DuplicateHeader { header: String },
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
