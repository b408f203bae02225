//! Mapping state for one import session.

use std::collections::BTreeSet;

use crate::error::{MappingError, Result};
use crate::mapped::{MappedColumns, MappedValue};
use crate::metadata::{ColumnDescriptor, MappingMetadata};
use crate::validate::{MappingIssue, validate};

/// Metadata plus the user's current column assignments.
///
/// Metadata is fixed at construction; assignments only exist relative to it.
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    metadata: MappingMetadata,
    mapped: MappedColumns,
}

impl ColumnMapping {
    pub fn new(metadata: MappingMetadata) -> Self {
        Self {
            metadata,
            mapped: MappedColumns::new(),
        }
    }

    pub fn metadata(&self) -> &MappingMetadata {
        &self.metadata
    }

    pub fn mapped_columns(&self) -> &MappedColumns {
        &self.mapped
    }

    /// Stores `value` for `field` as given. Shape problems are reported by
    /// [`ColumnMapping::validate`], not here. An empty single header clears
    /// the field.
    pub fn map_column(&mut self, field: &str, value: impl Into<MappedValue>) {
        match value.into() {
            MappedValue::Single(header) if header.is_empty() => {
                self.mapped.remove(field);
            }
            value => {
                tracing::debug!(field, value = ?value, "Column mapped");
                self.mapped.insert(field, value);
            }
        }
    }

    pub fn clear(&mut self, field: &str) -> bool {
        self.mapped.remove(field).is_some()
    }

    /// Applies assignments from a saved profile, rejecting unknown fields.
    pub fn apply_profile<'a>(
        &mut self,
        profile: impl IntoIterator<Item = (&'a str, &'a MappedValue)>,
    ) -> Result<()> {
        for (field, value) in profile {
            if !self.metadata.contains(field) {
                return Err(MappingError::UnknownField(field.to_string()));
            }
            self.map_column(field, value.clone());
        }
        Ok(())
    }

    /// Pre-selects columns for unmapped static fields.
    ///
    /// For each such field the first `headers_to_auto_map` entry that equals
    /// a dataset header, ignoring case, is chosen. Existing selections are
    /// never replaced. Returns the fields that were filled.
    pub fn auto_map(&mut self, headers: &[String]) -> Vec<String> {
        let mut filled = Vec::new();

        for field in self.metadata.fields() {
            if self.mapped.contains(&field.name) {
                continue;
            }
            let ColumnDescriptor::Static {
                headers_to_auto_map,
                ..
            } = &field.descriptor
            else {
                continue;
            };

            let found = headers_to_auto_map.iter().find_map(|candidate| {
                let candidate = candidate.to_lowercase();
                headers.iter().find(|h| h.to_lowercase() == candidate)
            });

            if let Some(header) = found {
                tracing::debug!(field = %field.name, header = %header, "Auto-mapped column");
                self.mapped
                    .insert(field.name.clone(), MappedValue::Single(header.clone()));
                filled.push(field.name.clone());
            }
        }

        filled
    }

    /// Drops references to headers that are not in `headers`.
    ///
    /// Called when a new dataset replaces the old one. Single-column fields
    /// pointing at a vanished header are cleared; multi-column fields lose
    /// the vanished entries. Returns the fields that changed.
    pub fn retain_headers(&mut self, headers: &[String]) -> Vec<String> {
        let known: BTreeSet<&str> = headers.iter().map(String::as_str).collect();
        let mut changed = Vec::new();

        self.mapped.retain(|field, value| match value {
            MappedValue::Single(header) => {
                let keep = known.contains(header.as_str());
                if !keep {
                    changed.push(field.to_string());
                }
                keep
            }
            MappedValue::Many(list) => {
                let before = list.len();
                list.retain(|h| known.contains(h.as_str()));
                if list.len() != before {
                    changed.push(field.to_string());
                }
                true
            }
        });

        if !changed.is_empty() {
            tracing::info!(fields = ?changed, "Column mapping adjusted to new dataset");
        }
        changed
    }

    /// Headers not already claimed by a static field.
    pub fn available_headers<'a>(&self, headers: &'a [String]) -> Vec<&'a str> {
        let used: BTreeSet<&str> = self
            .metadata
            .fields()
            .iter()
            .filter(|f| !f.descriptor.is_dynamic())
            .filter_map(|f| self.mapped.single(&f.name))
            .collect();
        headers
            .iter()
            .map(String::as_str)
            .filter(|h| !used.contains(h))
            .collect()
    }

    pub fn validate(&self) -> Vec<MappingIssue> {
        validate(&self.mapped, &self.metadata)
    }

    /// Like [`ColumnMapping::validate`] but as a `Result`.
    pub fn ensure_valid(&self) -> Result<()> {
        let issues = self.validate();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(MappingError::Invalid { issues })
        }
    }

    pub fn summary(&self) -> MappingSummary {
        let fields = self.metadata.fields();
        let is_mapped = |name: &str| self.mapped.get(name).is_some_and(|v| !v.is_empty());
        MappingSummary {
            total_fields: fields.len(),
            mapped: fields.iter().filter(|f| is_mapped(&f.name)).count(),
            required_total: fields.iter().filter(|f| f.descriptor.is_required()).count(),
            required_mapped: fields
                .iter()
                .filter(|f| f.descriptor.is_required() && is_mapped(&f.name))
                .count(),
        }
    }
}

/// Summary of mapping counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingSummary {
    /// Fields declared by the metadata.
    pub total_fields: usize,
    /// Fields with a non-empty assignment.
    pub mapped: usize,
    /// Required fields.
    pub required_total: usize,
    /// Required fields with a non-empty assignment.
    pub required_mapped: usize,
}
