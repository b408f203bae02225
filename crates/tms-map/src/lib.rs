//! Column mapping for spreadsheet imports.
//!
//! An import declares its semantic fields as [`MappingMetadata`]. Each field
//! is either static (one column) or dynamic (an ordered list of columns).
//! The user's choices live in [`MappedColumns`]; [`validate`] checks their
//! shape before the wizard may continue.
//!
//! # Example
//!
//! ```ignore
//! use tms_map::{ColumnMapping, fields, short_test_metadata};
//!
//! let mut mapping = ColumnMapping::new(short_test_metadata());
//! mapping.auto_map(dataset.headers());
//! mapping.map_column(fields::EXERCISES, vec!["1", "2"]);
//! assert!(mapping.validate().is_empty());
//! ```

#![deny(unsafe_code)]

mod error;
mod mapped;
mod metadata;
mod presets;
mod state;
mod validate;

pub use error::{MappingError, Result};
pub use mapped::{MappedColumns, MappedValue};
pub use metadata::{ColumnDescriptor, FieldMetadata, MappingMetadata};
pub use presets::{fields, short_test_metadata};
pub use state::{ColumnMapping, MappingSummary};
pub use validate::{MappingIssue, validate};
