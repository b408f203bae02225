//! Editable grading scheme seeded from the spreadsheet.
//!
//! The export does not say how many points each exercise is worth. The
//! draft guesses: one exercise per mapped exercise column, each seeded with
//! the value of the maximum-points column. The user edits the draft before
//! it becomes a [`ShortTestDefinition`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tms_map::{MappedColumns, fields};
use tms_model::{Dataset, ExerciseDefinition, ExerciseId, ShortTest, ShortTestDefinition};

use crate::error::{GradingError, Result};
use crate::points::parse_points;

/// One exercise of a draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseDraft {
    /// Set when the exercise already exists in the backend.
    pub id: Option<ExerciseId>,
    pub ex_name: String,
    pub max_points: f64,
}

/// A short test under edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortTestDraft {
    pub short_test_no: u32,
    pub percentage_needed: f64,
    pub exercises: Vec<ExerciseDraft>,
}

/// Values the spreadsheet cannot provide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DraftDefaults {
    pub short_test_no: u32,
    pub percentage_needed: f64,
}

impl Default for DraftDefaults {
    fn default() -> Self {
        Self {
            short_test_no: 1,
            percentage_needed: 0.5,
        }
    }
}

/// Seeds a draft from the mapped spreadsheet.
///
/// Exercises are named after their column headers, in mapping order. The
/// maximum is read once, from the first row with a value in the
/// maximum-points column; it is 0 when that column is unmapped or empty.
pub fn infer_draft(
    dataset: &Dataset,
    mapped: &MappedColumns,
    defaults: DraftDefaults,
) -> ShortTestDraft {
    let max_points = mapped
        .single(fields::TEST_MAXIMUM_POINTS)
        .and_then(|column| {
            dataset.first_row_with(column).map(|row| {
                let parsed = parse_points(row.cell(column));
                if let Some(problem) = &parsed.problem {
                    tracing::warn!(
                        row = row.row_nr,
                        column = %column,
                        problem = %problem,
                        "Maximum points unreadable; exercises seeded with 0"
                    );
                }
                parsed.value
            })
        })
        .unwrap_or(0.0);

    let exercises: Vec<ExerciseDraft> = mapped
        .many(fields::EXERCISES)
        .unwrap_or_default()
        .iter()
        .map(|column| ExerciseDraft {
            id: None,
            ex_name: column.clone(),
            max_points,
        })
        .collect();

    tracing::debug!(
        exercises = exercises.len(),
        max_points,
        "Inferred grading scheme"
    );

    ShortTestDraft {
        short_test_no: defaults.short_test_no,
        percentage_needed: defaults.percentage_needed,
        exercises,
    }
}

impl ShortTestDraft {
    /// Draft of an existing test, used when re-importing into it.
    pub fn from_test(test: &ShortTest) -> Self {
        Self {
            short_test_no: test.short_test_no,
            percentage_needed: test.percentage_needed,
            exercises: test
                .exercises
                .iter()
                .map(|ex| ExerciseDraft {
                    id: Some(ex.id.clone()),
                    ex_name: ex.ex_name.clone(),
                    max_points: ex.max_points,
                })
                .collect(),
        }
    }

    pub fn total_points(&self) -> f64 {
        self.exercises.iter().map(|ex| ex.max_points).sum()
    }

    /// Checks the draft and converts it into a repository payload.
    pub fn to_definition(&self) -> Result<ShortTestDefinition> {
        if self.short_test_no == 0 {
            return Err(GradingError::InvalidTestNumber);
        }
        if !(0.0..=1.0).contains(&self.percentage_needed) {
            return Err(GradingError::InvalidPercentage(self.percentage_needed));
        }
        if self.exercises.is_empty() {
            return Err(GradingError::NoExercises);
        }

        let mut names = BTreeSet::new();
        for exercise in &self.exercises {
            if !(exercise.max_points.is_finite() && exercise.max_points > 0.0) {
                return Err(GradingError::InvalidMaxPoints {
                    exercise: exercise.ex_name.clone(),
                    value: exercise.max_points,
                });
            }
            if !names.insert(exercise.ex_name.as_str()) {
                return Err(GradingError::DuplicateExerciseName(exercise.ex_name.clone()));
            }
        }

        Ok(ShortTestDefinition {
            short_test_no: self.short_test_no,
            percentage_needed: self.percentage_needed,
            exercises: self
                .exercises
                .iter()
                .map(|ex| ExerciseDefinition {
                    id: ex.id.clone(),
                    ex_name: ex.ex_name.clone(),
                    max_points: ex.max_points,
                })
                .collect(),
        })
    }
}
