//! Grading inference and construction for short-test imports.
//!
//! - [`infer_draft`] seeds an editable [`ShortTestDraft`] from the mapped
//!   spreadsheet columns
//! - [`GradingBuilder`] turns rows into [`GradingDto`](tms_model::GradingDto)s
//!   for the reconciled students
//! - [`parse_points`] reads point cells leniently; bad cells become 0 with a
//!   warning instead of an error

#![deny(unsafe_code)]

mod builder;
mod draft;
mod error;
mod points;

pub use builder::{
    ExerciseColumn, GradingBatch, GradingBuilder, GradingWarning, RowOutcome, WarningKind,
    pair_exercise_columns,
};
pub use draft::{DraftDefaults, ExerciseDraft, ShortTestDraft, infer_draft};
pub use error::{GradingError, Result};
pub use points::{ParsedPoints, PointsProblem, parse_points};
