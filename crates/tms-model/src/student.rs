use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{ShortTestId, StudentId};

/// A student record as served by the student directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Username in the external e-learning system, if known.
    #[serde(default)]
    pub ilias_name: Option<String>,
    /// Short tests this student already has a grading for.
    #[serde(default)]
    pub graded_short_tests: BTreeSet<ShortTestId>,
}

impl Student {
    pub fn new(id: StudentId) -> Self {
        Self {
            id,
            first_name: String::new(),
            last_name: String::new(),
            ilias_name: None,
            graded_short_tests: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_ilias_name(mut self, name: impl Into<String>) -> Self {
        self.ilias_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = first.into();
        self.last_name = last.into();
        self
    }

    pub fn has_existing_grading_for(&self, test_id: &ShortTestId) -> bool {
        self.graded_short_tests.contains(test_id)
    }

    /// "Last, First" for reports; falls back to the id when no name is known.
    pub fn display_name(&self) -> String {
        match (self.last_name.is_empty(), self.first_name.is_empty()) {
            (true, true) => self.id.to_string(),
            (false, true) => self.last_name.clone(),
            (true, false) => self.first_name.clone(),
            (false, false) => format!("{}, {}", self.last_name, self.first_name),
        }
    }
}
