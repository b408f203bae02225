//! Results export ingestion.
//!
//! Turns the CSV/TSV export of the e-learning system into a
//! [`ParsedTable`](tms_model::ParsedTable), the input of
//! [`Dataset::ingest`](tms_model::Dataset::ingest).
//!
//! # Example
//!
//! ```ignore
//! use tms_ingest::{Delimiter, read_table};
//! use tms_model::Dataset;
//!
//! let parsed = read_table(Path::new("results.csv"), Delimiter::Auto)?;
//! let dataset = Dataset::ingest(parsed)?;
//! ```

mod delimiter;
mod error;
mod reader;

// === Error Types ===
pub use error::{IngestError, Result};

// === Parsing ===
pub use delimiter::{Delimiter, detect_delimiter};
pub use reader::{MAX_EXPORT_FILE_SIZE, check_file_size, parse_table, read_table};
