//! Commits a finished import: save the test, then its gradings.

use tms_grading::{GradingBatch, GradingBuilder};
use tms_map::MappedColumns;
use tms_model::{Dataset, ShortTest, ShortTestDefinition, ShortTestId};
use tms_reconcile::Reconciliation;

use crate::collaborators::{GradingSubmitter, TestRepository};
use crate::error::SubmissionError;

/// Whether the import creates a test or overwrites one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestTarget {
    Create,
    Edit(ShortTestId),
}

/// Inputs needed to build gradings.
#[derive(Debug, Clone, Copy)]
pub struct GradingSource<'a> {
    pub dataset: &'a Dataset,
    pub mapped: &'a MappedColumns,
    pub reconciliation: &'a Reconciliation,
}

/// What was written.
#[derive(Debug, Clone)]
pub struct Submitted {
    pub test: ShortTest,
    pub batch: GradingBatch,
}

/// Runs the two writes of an import in order.
#[derive(Debug)]
pub struct SubmissionOrchestrator<'a, R, G> {
    tests: &'a R,
    gradings: &'a G,
}

impl<'a, R, G> SubmissionOrchestrator<'a, R, G>
where
    R: TestRepository,
    G: GradingSubmitter,
{
    pub fn new(tests: &'a R, gradings: &'a G) -> Self {
        Self { tests, gradings }
    }

    /// Saves the test, builds gradings against the saved exercise ids and
    /// submits them as one batch.
    ///
    /// No step is retried. If grading submission fails the test stays
    /// saved and the error carries it.
    pub async fn submit(
        &self,
        target: &TestTarget,
        definition: &ShortTestDefinition,
        source: GradingSource<'_>,
    ) -> Result<Submitted, SubmissionError> {
        let saved = match target {
            TestTarget::Create => self.tests.create_test(definition).await,
            TestTarget::Edit(id) => self.tests.edit_test(id, definition).await,
        };
        let test = saved.map_err(|source| {
            tracing::error!(error = %source, "Saving short test failed");
            SubmissionError::TestWrite { source }
        })?;
        tracing::info!(
            test = %test.id,
            number = test.short_test_no,
            exercises = test.exercises.len(),
            "Short test saved"
        );

        let builder = GradingBuilder::from_mapping(source.mapped, source.reconciliation, &test)
            .map_err(|source| SubmissionError::GradingBuild {
                test: Box::new(test.clone()),
                source,
            })?;
        let batch = builder.build_all(source.dataset);

        self.gradings
            .submit_gradings(&batch.gradings)
            .await
            .map_err(|source| {
                tracing::error!(test = %test.id, error = %source, "Submitting gradings failed");
                SubmissionError::GradingSubmit {
                    test: Box::new(test.clone()),
                    source,
                }
            })?;
        tracing::info!(test = %test.id, gradings = batch.gradings.len(), "Gradings submitted");

        Ok(Submitted { test, batch })
    }
}
