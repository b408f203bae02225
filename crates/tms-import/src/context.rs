//! Shared state of one import.

use tms_map::{ColumnMapping, MappedColumns, MappedValue, MappingMetadata, fields};
use tms_model::{Dataset, ParsedTable, Student};
use tms_reconcile::{Reconciliation, reconcile};

use crate::error::{ImportError, Result};

/// What changed when a spreadsheet was loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestOutcome {
    pub rows: usize,
    /// Fields that lost columns missing from the new headers.
    pub adjusted_fields: Vec<String>,
    /// Fields filled by auto-mapping.
    pub auto_mapped_fields: Vec<String>,
}

/// Dataset, column mapping and username reconciliation of one import.
#[derive(Debug, Clone)]
pub struct ImportContext {
    dataset: Option<Dataset>,
    mapping: ColumnMapping,
    reconciliation: Option<Reconciliation>,
}

impl ImportContext {
    pub fn new(metadata: MappingMetadata) -> Self {
        Self {
            dataset: None,
            mapping: ColumnMapping::new(metadata),
            reconciliation: None,
        }
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn mapping_metadata(&self) -> &MappingMetadata {
        self.mapping.metadata()
    }

    pub fn mapped_columns(&self) -> &MappedColumns {
        self.mapping.mapped_columns()
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    pub fn mapping_mut(&mut self) -> &mut ColumnMapping {
        &mut self.mapping
    }

    pub fn map_column(&mut self, field: &str, value: impl Into<MappedValue>) {
        self.mapping.map_column(field, value);
    }

    /// Replaces the dataset with a freshly parsed table.
    ///
    /// Mapped columns missing from the new headers are cleared and empty
    /// fields are auto-mapped again. Row numbers restart at 0, so an earlier
    /// reconciliation is refreshed on the next [`Self::reconcile`].
    pub fn ingest(&mut self, table: ParsedTable) -> Result<IngestOutcome> {
        let dataset = Dataset::ingest(table)?;
        let adjusted_fields = self.mapping.retain_headers(dataset.headers());
        let auto_mapped_fields = self.mapping.auto_map(dataset.headers());

        tracing::info!(
            rows = dataset.len(),
            columns = dataset.headers().len(),
            adjusted = adjusted_fields.len(),
            auto_mapped = auto_mapped_fields.len(),
            "Spreadsheet loaded"
        );

        let outcome = IngestOutcome {
            rows: dataset.len(),
            adjusted_fields,
            auto_mapped_fields,
        };
        self.dataset = Some(dataset);
        Ok(outcome)
    }

    /// Matches usernames against `students`, keeping earlier manual
    /// decisions that still apply. Returns usernames whose decisions were
    /// dropped.
    pub fn reconcile(&mut self, students: &[Student]) -> Result<Vec<String>> {
        let dataset = self.dataset.as_ref().ok_or(ImportError::NoDataset)?;
        let column = self
            .mapping
            .mapped_columns()
            .single(fields::ILIAS_NAME)
            .ok_or_else(|| {
                tms_grading::GradingError::MissingColumn(fields::ILIAS_NAME.to_string())
            })?;

        let dropped = match &mut self.reconciliation {
            Some(existing) => existing.refresh(dataset, column, students),
            None => {
                self.reconciliation = Some(reconcile(dataset, column, students));
                Vec::new()
            }
        };
        Ok(dropped)
    }

    pub fn reconciliation(&self) -> Option<&Reconciliation> {
        self.reconciliation.as_ref()
    }

    pub fn reconciliation_mut(&mut self) -> Option<&mut Reconciliation> {
        self.reconciliation.as_mut()
    }
}
