//! Field metadata describing what an import expects from the spreadsheet.

use serde::{Deserialize, Serialize};

/// How a semantic field is fed from spreadsheet columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnDescriptor {
    /// Exactly one column.
    Static {
        label: String,
        required: bool,
        /// Header names tried, in order, when pre-selecting a column.
        #[serde(default)]
        headers_to_auto_map: Vec<String>,
        #[serde(default)]
        group: Option<String>,
    },
    /// A user-chosen, ordered set of columns.
    Dynamic {
        label: String,
        required: bool,
        #[serde(default)]
        group: Option<String>,
    },
}

impl ColumnDescriptor {
    pub fn label(&self) -> &str {
        match self {
            Self::Static { label, .. } | Self::Dynamic { label, .. } => label,
        }
    }

    pub fn is_required(&self) -> bool {
        match self {
            Self::Static { required, .. } | Self::Dynamic { required, .. } => *required,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic { .. })
    }

    /// Display group; has no effect on mapping or validation.
    pub fn group(&self) -> Option<&str> {
        match self {
            Self::Static { group, .. } | Self::Dynamic { group, .. } => group.as_deref(),
        }
    }
}

/// A named field with its descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMetadata {
    pub name: String,
    #[serde(flatten)]
    pub descriptor: ColumnDescriptor,
}

/// Ordered field list of an import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingMetadata {
    fields: Vec<FieldMetadata>,
}

impl MappingMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, replacing an earlier one with the same name.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, descriptor: ColumnDescriptor) -> Self {
        let name = name.into();
        self.fields.retain(|f| f.name != name);
        self.fields.push(FieldMetadata { name, descriptor });
        self
    }

    pub fn fields(&self) -> &[FieldMetadata] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.descriptor)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}
