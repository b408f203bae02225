//! Field metadata of the short-test results import.

use crate::metadata::{ColumnDescriptor, MappingMetadata};

/// Field names used by the short-test import.
pub mod fields {
    /// Username column used to find the student.
    pub const ILIAS_NAME: &str = "iliasName";
    /// Total points the student reached.
    pub const TEST_RESULT_STUDENT: &str = "testResultStudent";
    /// Maximum points of the test.
    pub const TEST_MAXIMUM_POINTS: &str = "testMaximumPoints";
    /// One column per exercise.
    pub const EXERCISES: &str = "exercises";
}

/// Metadata for importing short-test results from an ILIAS export.
pub fn short_test_metadata() -> MappingMetadata {
    MappingMetadata::new()
        .with_field(
            fields::ILIAS_NAME,
            ColumnDescriptor::Static {
                label: "Username".to_string(),
                required: true,
                headers_to_auto_map: vec![
                    "Benutzername".to_string(),
                    "Login".to_string(),
                    "Username".to_string(),
                ],
                group: Some("Student".to_string()),
            },
        )
        .with_field(
            fields::TEST_RESULT_STUDENT,
            ColumnDescriptor::Static {
                label: "Points reached".to_string(),
                required: false,
                headers_to_auto_map: vec!["Testergebnis in Punkten".to_string()],
                group: Some("Test".to_string()),
            },
        )
        .with_field(
            fields::TEST_MAXIMUM_POINTS,
            ColumnDescriptor::Static {
                label: "Maximum points".to_string(),
                required: false,
                headers_to_auto_map: vec!["Maximal erreichbare Punktezahl".to_string()],
                group: Some("Test".to_string()),
            },
        )
        .with_field(
            fields::EXERCISES,
            ColumnDescriptor::Dynamic {
                label: "Exercises".to_string(),
                required: true,
                group: Some("Exercises".to_string()),
            },
        )
}
