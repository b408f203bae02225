use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ExerciseId, ShortTestId};

/// Points reached in a single exercise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExerciseGrading {
    pub points: f64,
}

/// Grading payload for one student and one short test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingDto {
    pub short_test_id: ShortTestId,
    pub exercise_gradings: BTreeMap<ExerciseId, ExerciseGrading>,
    /// True if the student has no grading for this test yet; tells the
    /// backend to create a record instead of patching one.
    pub create_new_grading: bool,
}

impl GradingDto {
    pub fn total_points(&self) -> f64 {
        self.exercise_gradings.values().map(|g| g.points).sum()
    }

    pub fn points_for(&self, exercise: &ExerciseId) -> Option<f64> {
        self.exercise_gradings.get(exercise).map(|g| g.points)
    }
}
