//! Structural validation of column mappings.

use std::fmt;

use serde::Serialize;

use crate::mapped::MappedColumns;
use crate::metadata::MappingMetadata;

/// A problem that blocks leaving the mapping step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MappingIssue {
    /// A required field has no column, or an empty column list.
    RequiredMissing { field: String, label: String },
    /// A multi-column field holds a single column.
    ExpectedSequence { field: String, label: String },
}

impl MappingIssue {
    pub fn field(&self) -> &str {
        match self {
            Self::RequiredMissing { field, .. } | Self::ExpectedSequence { field, .. } => field,
        }
    }
}

impl fmt::Display for MappingIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequiredMissing { label, .. } => {
                write!(f, "'{label}' is required but no column is assigned")
            }
            Self::ExpectedSequence { label, .. } => {
                write!(f, "'{label}' expects a list of columns")
            }
        }
    }
}

/// Checks `mapped` against `metadata`.
///
/// Only the shape of the mapping is checked; whether the headers exist in
/// the current dataset is not. Issues are reported in field order.
pub fn validate(mapped: &MappedColumns, metadata: &MappingMetadata) -> Vec<MappingIssue> {
    let mut issues = Vec::new();

    for field in metadata.fields() {
        let descriptor = &field.descriptor;
        let value = mapped.get(&field.name);

        if descriptor.is_required() && value.is_none_or(|v| v.is_empty()) {
            issues.push(MappingIssue::RequiredMissing {
                field: field.name.clone(),
                label: descriptor.label().to_string(),
            });
            continue;
        }

        if descriptor.is_dynamic() && value.is_some_and(|v| !v.is_sequence()) {
            issues.push(MappingIssue::ExpectedSequence {
                field: field.name.clone(),
                label: descriptor.label().to_string(),
            });
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapped::MappedValue;
    use crate::metadata::ColumnDescriptor;

    fn metadata() -> MappingMetadata {
        MappingMetadata::new()
            .with_field(
                "login",
                ColumnDescriptor::Static {
                    label: "Login".to_string(),
                    required: true,
                    headers_to_auto_map: vec![],
                    group: None,
                },
            )
            .with_field(
                "note",
                ColumnDescriptor::Static {
                    label: "Note".to_string(),
                    required: false,
                    headers_to_auto_map: vec![],
                    group: None,
                },
            )
            .with_field(
                "tasks",
                ColumnDescriptor::Dynamic {
                    label: "Tasks".to_string(),
                    required: true,
                    group: None,
                },
            )
    }

    #[test]
    fn complete_mapping_is_valid() {
        let mut mapped = MappedColumns::new();
        mapped.insert("login", MappedValue::from("User"));
        mapped.insert("tasks", MappedValue::from(vec!["1", "2"]));
        assert!(validate(&mapped, &metadata()).is_empty());
    }

    #[test]
    fn empty_sequence_counts_as_missing() {
        let mut mapped = MappedColumns::new();
        mapped.insert("login", MappedValue::from("User"));
        mapped.insert("tasks", MappedValue::Many(vec![]));
        let issues = validate(&mapped, &metadata());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field(), "tasks");
    }

    #[test]
    fn dynamic_single_value_is_rejected() {
        let mut mapped = MappedColumns::new();
        mapped.insert("login", MappedValue::from("User"));
        mapped.insert("tasks", MappedValue::from("1"));
        let issues = validate(&mapped, &metadata());
        assert_eq!(
            issues,
            vec![MappingIssue::ExpectedSequence {
                field: "tasks".to_string(),
                label: "Tasks".to_string()
            }]
        );
    }

    #[test]
    fn headers_are_not_checked_against_data() {
        let mut mapped = MappedColumns::new();
        mapped.insert("login", MappedValue::from("No such header"));
        mapped.insert("tasks", MappedValue::from(vec!["X"]));
        assert!(validate(&mapped, &metadata()).is_empty());
    }

    #[test]
    fn messages_are_readable() {
        let issues = validate(&MappedColumns::new(), &metadata());
        let text = issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        insta::assert_snapshot!(text, @r"
        'Login' is required but no column is assigned
        'Tasks' is required but no column is assigned
        ");
    }
}
