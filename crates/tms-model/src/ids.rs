use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ModelError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
                let value = value.into();
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(ModelError::InvalidId {
                        kind: $kind,
                        value,
                    });
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Backend identifier of a student record.
    StudentId,
    "student"
);

string_id!(
    /// Backend identifier of a short test.
    ShortTestId,
    "short test"
);

string_id!(
    /// Backend identifier of an exercise within a short test.
    ExerciseId,
    "exercise"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_trimmed() {
        let id = StudentId::new("  s-1 ").unwrap();
        assert_eq!(id.as_str(), "s-1");
        assert_eq!(id.to_string(), "s-1");
    }

    #[test]
    fn blank_ids_are_rejected() {
        let err = ExerciseId::new("   ").unwrap_err();
        assert_eq!(err.to_string(), "invalid exercise id: '   '");
    }
}
