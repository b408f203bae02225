//! Error types for grading construction.

use thiserror::Error;

/// Errors that stop a grading scheme from being used.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum GradingError {
    /// Short test numbers start at 1.
    #[error("short test number must be at least 1")]
    InvalidTestNumber,

    /// Pass threshold outside `0.0..=1.0`.
    #[error("percentage needed must be between 0 and 1, got {0}")]
    InvalidPercentage(f64),

    /// A test needs at least one exercise.
    #[error("short test has no exercises")]
    NoExercises,

    /// Exercise maximum is not a positive number.
    #[error("exercise '{exercise}' has invalid maximum points {value}")]
    InvalidMaxPoints { exercise: String, value: f64 },

    /// Exercise names must be unique within a test.
    #[error("exercise name '{0}' is used twice")]
    DuplicateExerciseName(String),

    /// Mapped exercise columns and test exercises do not line up.
    #[error("{columns} exercise column(s) mapped but the test has {exercises} exercise(s)")]
    ExerciseCountMismatch { columns: usize, exercises: usize },

    /// A field needed for grading has no column.
    #[error("no column mapped for '{0}'")]
    MissingColumn(String),
}

/// Result type for grading operations.
pub type Result<T> = std::result::Result<T, GradingError>;
