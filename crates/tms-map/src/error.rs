//! Error types for mapping operations.

use thiserror::Error;

use crate::validate::MappingIssue;

/// Errors from mapping operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MappingError {
    /// Field is not part of the import metadata.
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// The mapping failed structural validation.
    #[error("Column mapping is incomplete ({} issue(s))", issues.len())]
    Invalid {
        /// Every issue found, in field order.
        issues: Vec<MappingIssue>,
    },
}

/// Result type for mapping operations.
pub type Result<T> = std::result::Result<T, MappingError>;
