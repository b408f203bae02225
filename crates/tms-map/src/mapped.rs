//! User-selected column assignments.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Column(s) assigned to a field.
///
/// Serialized untagged, so a profile reads `field = "Header"` or
/// `field = ["A", "B"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MappedValue {
    Single(String),
    Many(Vec<String>),
}

impl MappedValue {
    pub fn is_sequence(&self) -> bool {
        matches!(self, Self::Many(_))
    }

    /// True for an empty sequence.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(_) => false,
            Self::Many(headers) => headers.is_empty(),
        }
    }

    /// All headers referenced by this value.
    pub fn headers(&self) -> &[String] {
        match self {
            Self::Single(header) => std::slice::from_ref(header),
            Self::Many(headers) => headers,
        }
    }
}

impl From<&str> for MappedValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for MappedValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for MappedValue {
    fn from(value: Vec<String>) -> Self {
        Self::Many(value)
    }
}

impl From<Vec<&str>> for MappedValue {
    fn from(value: Vec<&str>) -> Self {
        Self::Many(value.into_iter().map(str::to_string).collect())
    }
}

/// Field name to assigned column(s).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappedColumns(BTreeMap<String, MappedValue>);

impl MappedColumns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&MappedValue> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: MappedValue) {
        self.0.insert(field.into(), value);
    }

    pub fn remove(&mut self, field: &str) -> Option<MappedValue> {
        self.0.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// The header of a single-column field.
    pub fn single(&self, field: &str) -> Option<&str> {
        match self.0.get(field) {
            Some(MappedValue::Single(header)) => Some(header),
            _ => None,
        }
    }

    /// The headers of a multi-column field.
    pub fn many(&self, field: &str) -> Option<&[String]> {
        match self.0.get(field) {
            Some(MappedValue::Many(headers)) => Some(headers),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MappedValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&str, &mut MappedValue) -> bool) {
        self.0.retain(|field, value| keep(field, value));
    }
}

impl FromIterator<(String, MappedValue)> for MappedColumns {
    fn from_iter<I: IntoIterator<Item = (String, MappedValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
