//! Conversion of spreadsheet rows into grading payloads.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tms_map::{MappedColumns, fields};
use tms_model::{
    Dataset, ExerciseGrading, ExerciseId, GradingDto, Row, ShortTest, ShortTestId, Student,
    StudentId,
};
use tms_reconcile::Reconciliation;

use crate::error::{GradingError, Result};
use crate::points::{PointsProblem, parse_points};

/// Tolerance when comparing the exported total with the exercise sum.
const TOTAL_TOLERANCE: f64 = 1e-6;

/// A spreadsheet column feeding one exercise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseColumn {
    pub header: String,
    pub exercise_id: ExerciseId,
}

/// Pairs mapped exercise columns with the test's exercises by position.
pub fn pair_exercise_columns(columns: &[String], test: &ShortTest) -> Result<Vec<ExerciseColumn>> {
    if columns.len() != test.exercises.len() {
        return Err(GradingError::ExerciseCountMismatch {
            columns: columns.len(),
            exercises: test.exercises.len(),
        });
    }
    Ok(columns
        .iter()
        .zip(&test.exercises)
        .map(|(header, exercise)| ExerciseColumn {
            header: header.clone(),
            exercise_id: exercise.id.clone(),
        })
        .collect())
}

/// Non-fatal problem found while building gradings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradingWarning {
    pub row_nr: usize,
    pub kind: WarningKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WarningKind {
    /// No student is assigned to the row's username; the row is dropped.
    UnmatchedUsername { username: String },
    /// A points cell was empty or malformed and counted as 0.
    InvalidPoints { column: String, value: String },
    /// The exported total differs from the sum of exercise points.
    TotalMismatch { exported: f64, computed: f64 },
    /// A later row graded the same student again and replaced the earlier one.
    DuplicateStudent { student: StudentId },
}

impl fmt::Display for GradingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: ", self.row_nr + 1)?;
        match &self.kind {
            WarningKind::UnmatchedUsername { username } => {
                write!(f, "no student assigned to '{username}', row skipped")
            }
            WarningKind::InvalidPoints { column, value } => {
                write!(f, "points '{value}' in column '{column}' counted as 0")
            }
            WarningKind::TotalMismatch { exported, computed } => {
                write!(f, "exported total {exported} differs from exercise sum {computed}")
            }
            WarningKind::DuplicateStudent { student } => {
                write!(f, "student {student} graded again, earlier row replaced")
            }
        }
    }
}

/// What became of one row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Graded {
        student: Student,
        grading: GradingDto,
        warnings: Vec<GradingWarning>,
    },
    /// Username cell empty: a leftover of earlier import runs in the export.
    SkippedEmptyUsername,
    SkippedUnmatched { warning: GradingWarning },
}

impl RowOutcome {
    pub fn into_grading(self) -> Option<(Student, GradingDto)> {
        match self {
            Self::Graded {
                student, grading, ..
            } => Some((student, grading)),
            Self::SkippedEmptyUsername | Self::SkippedUnmatched { .. } => None,
        }
    }
}

/// Gradings of a whole dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradingBatch {
    pub gradings: BTreeMap<StudentId, GradingDto>,
    pub students: BTreeMap<StudentId, Student>,
    pub warnings: Vec<GradingWarning>,
    pub skipped_empty: usize,
    pub skipped_unmatched: usize,
}

/// Builds gradings for one short test.
#[derive(Debug)]
pub struct GradingBuilder<'a> {
    ilias_name_column: &'a str,
    total_column: Option<&'a str>,
    exercise_columns: Vec<ExerciseColumn>,
    reconciliation: &'a Reconciliation,
    test_id: ShortTestId,
}

impl<'a> GradingBuilder<'a> {
    pub fn new(
        ilias_name_column: &'a str,
        exercise_columns: Vec<ExerciseColumn>,
        reconciliation: &'a Reconciliation,
        test_id: ShortTestId,
    ) -> Self {
        Self {
            ilias_name_column,
            total_column: None,
            exercise_columns,
            reconciliation,
            test_id,
        }
    }

    /// Builder for `test` using the columns in `mapped`.
    pub fn from_mapping(
        mapped: &'a MappedColumns,
        reconciliation: &'a Reconciliation,
        test: &ShortTest,
    ) -> Result<Self> {
        let ilias_name_column = mapped
            .single(fields::ILIAS_NAME)
            .ok_or_else(|| GradingError::MissingColumn(fields::ILIAS_NAME.to_string()))?;
        let columns = mapped
            .many(fields::EXERCISES)
            .ok_or_else(|| GradingError::MissingColumn(fields::EXERCISES.to_string()))?;
        let exercise_columns = pair_exercise_columns(columns, test)?;

        let mut builder = Self::new(
            ilias_name_column,
            exercise_columns,
            reconciliation,
            test.id.clone(),
        );
        builder.total_column = mapped.single(fields::TEST_RESULT_STUDENT);
        Ok(builder)
    }

    /// Grading for one row, or `None` if the row is skipped.
    pub fn build_grading(&self, row: &Row) -> Option<(Student, GradingDto)> {
        self.build_row(row).into_grading()
    }

    /// Outcome for one row, including the warnings it produced.
    pub fn build_row(&self, row: &Row) -> RowOutcome {
        let username = row.cell(self.ilias_name_column);
        if username.is_empty() {
            return RowOutcome::SkippedEmptyUsername;
        }

        let Some(student) = self.reconciliation.get_mapping(username) else {
            tracing::warn!(row = row.row_nr, "No student assigned to username; row skipped");
            return RowOutcome::SkippedUnmatched {
                warning: GradingWarning {
                    row_nr: row.row_nr,
                    kind: WarningKind::UnmatchedUsername {
                        username: username.to_string(),
                    },
                },
            };
        };

        let mut warnings = Vec::new();
        let mut exercise_gradings = BTreeMap::new();
        for column in &self.exercise_columns {
            let cell = row.cell(&column.header);
            let parsed = parse_points(cell);
            if let Some(problem) = &parsed.problem {
                tracing::warn!(
                    row = row.row_nr,
                    column = %column.header,
                    problem = %problem,
                    "Unparsable points counted as 0"
                );
                warnings.push(GradingWarning {
                    row_nr: row.row_nr,
                    kind: WarningKind::InvalidPoints {
                        column: column.header.clone(),
                        value: match problem {
                            PointsProblem::Empty => String::new(),
                            PointsProblem::Invalid(raw) => raw.clone(),
                        },
                    },
                });
            }
            exercise_gradings.insert(
                column.exercise_id.clone(),
                ExerciseGrading {
                    points: parsed.value,
                },
            );
        }

        let grading = GradingDto {
            short_test_id: self.test_id.clone(),
            exercise_gradings,
            create_new_grading: !student.has_existing_grading_for(&self.test_id),
        };

        if let Some(total_column) = self.total_column {
            let exported = parse_points(row.cell(total_column));
            let computed = grading.total_points();
            if exported.is_clean() && (exported.value - computed).abs() > TOTAL_TOLERANCE {
                tracing::warn!(
                    row = row.row_nr,
                    exported = exported.value,
                    computed,
                    "Exported total differs from exercise sum"
                );
                warnings.push(GradingWarning {
                    row_nr: row.row_nr,
                    kind: WarningKind::TotalMismatch {
                        exported: exported.value,
                        computed,
                    },
                });
            }
        }

        RowOutcome::Graded {
            student: student.clone(),
            grading,
            warnings,
        }
    }

    /// Builds gradings for every row of `dataset`.
    pub fn build_all(&self, dataset: &Dataset) -> GradingBatch {
        let mut batch = GradingBatch::default();

        for row in dataset.rows() {
            match self.build_row(row) {
                RowOutcome::Graded {
                    student,
                    grading,
                    warnings,
                } => {
                    batch.warnings.extend(warnings);
                    if batch.gradings.insert(student.id.clone(), grading).is_some() {
                        batch.warnings.push(GradingWarning {
                            row_nr: row.row_nr,
                            kind: WarningKind::DuplicateStudent {
                                student: student.id.clone(),
                            },
                        });
                    }
                    batch.students.insert(student.id.clone(), student);
                }
                RowOutcome::SkippedEmptyUsername => batch.skipped_empty += 1,
                RowOutcome::SkippedUnmatched { warning } => {
                    batch.skipped_unmatched += 1;
                    batch.warnings.push(warning);
                }
            }
        }

        tracing::info!(
            gradings = batch.gradings.len(),
            skipped_empty = batch.skipped_empty,
            skipped_unmatched = batch.skipped_unmatched,
            warnings = batch.warnings.len(),
            "Built gradings"
        );
        batch
    }
}
