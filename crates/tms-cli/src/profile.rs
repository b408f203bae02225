//! Saved import settings and test overrides.
//!
//! A mapping profile is a TOML file that records how one kind of export is
//! read:
//!
//! ```toml
//! delimiter = "semicolon"
//! percentage_needed = 0.5
//!
//! [columns]
//! iliasName = "Benutzername"
//! exercises = ["Aufgabe 1", "Aufgabe 2"]
//! ```
//!
//! Every key is optional. Columns not listed are auto-mapped.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tms_grading::ShortTestDraft;
use tms_ingest::Delimiter;
use tms_map::{MappedColumns, MappedValue};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportProfile {
    pub delimiter: Delimiter,
    pub short_test_no: Option<u32>,
    pub percentage_needed: Option<f64>,
    /// Field name to column header(s).
    pub columns: BTreeMap<String, MappedValue>,
}

impl ImportProfile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read mapping profile: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("parse mapping profile: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("serialize mapping profile")?;
        std::fs::write(path, content)
            .with_context(|| format!("write mapping profile: {}", path.display()))
    }

    /// This profile with its columns replaced by `mapped`.
    #[must_use]
    pub fn with_columns(&self, mapped: &MappedColumns) -> Self {
        Self {
            columns: mapped
                .iter()
                .map(|(field, value)| (field.to_string(), value.clone()))
                .collect(),
            ..self.clone()
        }
    }

    /// Column assignments in the form the mapping accepts.
    pub fn column_assignments(&self) -> impl Iterator<Item = (&str, &MappedValue)> {
        self.columns.iter().map(|(field, value)| (field.as_str(), value))
    }
}

/// Grading scheme values set on the command line (`--test`).
///
/// JSON, keys in camelCase. `maxPoints` is keyed by exercise name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TestOverrides {
    pub short_test_no: Option<u32>,
    pub percentage_needed: Option<f64>,
    pub max_points: BTreeMap<String, f64>,
}

impl TestOverrides {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read test overrides: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parse test overrides: {}", path.display()))
    }

    /// Applies the overrides, returning names in `max_points` that match no
    /// exercise.
    pub fn apply(&self, draft: &mut ShortTestDraft) -> Vec<String> {
        if let Some(no) = self.short_test_no {
            draft.short_test_no = no;
        }
        if let Some(percentage) = self.percentage_needed {
            draft.percentage_needed = percentage;
        }

        let mut unknown = Vec::new();
        for (name, max) in &self.max_points {
            match draft.exercises.iter_mut().find(|ex| &ex.ex_name == name) {
                Some(exercise) => exercise.max_points = *max,
                None => unknown.push(name.clone()),
            }
        }
        unknown
    }
}
