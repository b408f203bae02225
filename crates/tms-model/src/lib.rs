//! Domain types for the short-test result import.
//!
//! - [`Dataset`]: spreadsheet rows with stable row numbers
//! - [`Student`]: directory records, keyed by [`StudentId`]
//! - [`ShortTest`] / [`ShortTestDefinition`]: persisted tests and edit payloads
//! - [`GradingDto`]: per-student grading submitted to the backend

#![deny(unsafe_code)]

mod dataset;
mod error;
mod grading;
mod ids;
mod student;

pub use dataset::{Dataset, ParsedTable, Row};
pub use error::{ModelError, Result};
pub use grading::{ExerciseGrading, GradingDto};
pub use ids::{ExerciseId, ShortTestId, StudentId};
pub use short_test::{Exercise, ExerciseDefinition, ShortTest, ShortTestDefinition};
pub use student::Student;
