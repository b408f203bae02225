//! The four-step short-test import.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tms_grading::{DraftDefaults, GradingError, GradingWarning, ShortTestDraft, infer_draft};
use tms_map::{MappedColumns, MappedValue, MappingMetadata, fields, short_test_metadata};
use tms_model::{Dataset, ParsedTable, ShortTest, ShortTestId, Student, StudentId};
use tms_reconcile::Reconciliation;

use crate::collaborators::{Collaborators, GradingSubmitter, StudentDirectory, TestRepository};
use crate::context::{ImportContext, IngestOutcome};
use crate::error::{ImportError, Result};
use crate::stepper::{NextRequest, StepDescriptor, StepResult, Stepper, Transition};
use crate::submission::{GradingSource, SubmissionOrchestrator, Submitted, TestTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStep {
    Upload,
    MapColumns,
    AssignStudents,
    ConfigureTest,
}

impl ImportStep {
    pub const ALL: [ImportStep; 4] = [
        ImportStep::Upload,
        ImportStep::MapColumns,
        ImportStep::AssignStudents,
        ImportStep::ConfigureTest,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::Upload => 0,
            Self::MapColumns => 1,
            Self::AssignStudents => 2,
            Self::ConfigureTest => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Upload => "Upload results",
            Self::MapColumns => "Map columns",
            Self::AssignStudents => "Assign students",
            Self::ConfigureTest => "Configure short test",
        }
    }
}

/// One student graded by the import.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradedStudent {
    pub student_id: StudentId,
    pub name: String,
    pub points: f64,
    /// False when an earlier grading was overwritten.
    pub new_grading: bool,
}

/// Result of a committed import.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub test: ShortTest,
    /// True when the test was created rather than edited.
    pub created: bool,
    pub graded: Vec<GradedStudent>,
    pub warnings: Vec<GradingWarning>,
    pub unmatched_names: Vec<String>,
    pub unmatched_students: Vec<Student>,
    pub skipped_empty_rows: usize,
    pub imported_at: DateTime<Utc>,
}

impl ImportReport {
    fn new(submitted: Submitted, created: bool, reconciliation: &Reconciliation) -> Self {
        let Submitted { test, batch } = submitted;
        let graded = batch
            .gradings
            .iter()
            .map(|(id, grading)| GradedStudent {
                student_id: id.clone(),
                name: batch
                    .students
                    .get(id)
                    .map_or_else(|| id.to_string(), Student::display_name),
                points: grading.total_points(),
                new_grading: grading.create_new_grading,
            })
            .collect();

        Self {
            test,
            created,
            graded,
            warnings: batch.warnings,
            unmatched_names: reconciliation.unmatched_names().to_vec(),
            unmatched_students: reconciliation.unmatched_students().to_vec(),
            skipped_empty_rows: batch.skipped_empty,
            imported_at: Utc::now(),
        }
    }
}

/// Owns the state of one import and drives it through its steps.
///
/// Every step claims its gate when entered, so [`ImportWizard::next_step`]
/// only advances when the step's checks pass. A failed step stays active
/// and its error is available from [`ImportWizard::last_error`].
#[derive(Debug)]
pub struct ImportWizard<D, R, G> {
    collaborators: Collaborators<D, R, G>,
    context: ImportContext,
    stepper: Stepper,
    target: TestTarget,
    defaults: DraftDefaults,
    draft: Option<ShortTestDraft>,
    /// Exercise columns the draft was inferred from.
    draft_columns: Vec<String>,
    last_error: Option<ImportError>,
    report: Option<ImportReport>,
}

impl<D, R, G> ImportWizard<D, R, G>
where
    D: StudentDirectory,
    R: TestRepository,
    G: GradingSubmitter,
{
    /// Wizard that creates a new short test.
    pub fn new(collaborators: Collaborators<D, R, G>, defaults: DraftDefaults) -> Self {
        Self::with_target(collaborators, TestTarget::Create, defaults, None)
    }

    /// Wizard that re-imports results into an existing test.
    ///
    /// The grading scheme starts from the stored test instead of being
    /// inferred from the spreadsheet.
    pub async fn for_existing_test(
        collaborators: Collaborators<D, R, G>,
        id: ShortTestId,
    ) -> Result<Self> {
        let test = collaborators
            .tests
            .get_test(&id)
            .await
            .map_err(|source| ImportError::TestLookup {
                id: id.clone(),
                source,
            })?;
        tracing::info!(test = %test.id, number = test.short_test_no, "Editing existing short test");

        let draft = ShortTestDraft::from_test(&test);
        let defaults = DraftDefaults {
            short_test_no: test.short_test_no,
            percentage_needed: test.percentage_needed,
        };
        Ok(Self::with_target(
            collaborators,
            TestTarget::Edit(test.id),
            defaults,
            Some(draft),
        ))
    }

    fn with_target(
        collaborators: Collaborators<D, R, G>,
        target: TestTarget,
        defaults: DraftDefaults,
        draft: Option<ShortTestDraft>,
    ) -> Self {
        let steps = ImportStep::ALL
            .iter()
            .map(|step| {
                let descriptor = StepDescriptor::new(step.label());
                if *step == ImportStep::AssignStudents {
                    descriptor.skippable()
                } else {
                    descriptor
                }
            })
            .collect();
        let mut stepper = Stepper::new(steps);
        stepper.claim_gate(ImportStep::Upload.index());

        Self {
            collaborators,
            context: ImportContext::new(short_test_metadata()),
            stepper,
            target,
            defaults,
            draft,
            draft_columns: Vec::new(),
            last_error: None,
            report: None,
        }
    }

    pub fn context(&self) -> &ImportContext {
        &self.context
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.context.dataset()
    }

    pub fn mapping_metadata(&self) -> &MappingMetadata {
        self.context.mapping_metadata()
    }

    pub fn mapped_columns(&self) -> &MappedColumns {
        self.context.mapped_columns()
    }

    pub fn map_column(&mut self, field: &str, value: impl Into<MappedValue>) {
        self.context.map_column(field, value);
    }

    /// Mutable access for bulk mapping changes such as saved profiles.
    pub fn context_mut(&mut self) -> &mut ImportContext {
        &mut self.context
    }

    /// Loads a parsed spreadsheet, replacing any earlier one.
    pub fn upload(&mut self, table: ParsedTable) -> Result<IngestOutcome> {
        self.context.ingest(table)
    }

    pub fn reconciliation(&self) -> Option<&Reconciliation> {
        self.context.reconciliation()
    }

    pub fn reconciliation_mut(&mut self) -> Option<&mut Reconciliation> {
        self.context.reconciliation_mut()
    }

    pub fn draft(&self) -> Option<&ShortTestDraft> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut ShortTestDraft> {
        self.draft.as_mut()
    }

    pub fn target(&self) -> &TestTarget {
        &self.target
    }

    pub fn steps(&self) -> &[StepDescriptor] {
        self.stepper.steps()
    }

    pub fn active_step_index(&self) -> usize {
        self.stepper.active_step_index()
    }

    /// `None` once the import is finished.
    pub fn active_step(&self) -> Option<ImportStep> {
        ImportStep::from_index(self.stepper.active_step_index())
    }

    pub fn is_finished(&self) -> bool {
        self.stepper.is_finished()
    }

    /// Why the last step check failed, cleared by the next success.
    pub fn last_error(&self) -> Option<&ImportError> {
        self.last_error.as_ref()
    }

    pub fn take_last_error(&mut self) -> Option<ImportError> {
        self.last_error.take()
    }

    pub fn report(&self) -> Option<&ImportReport> {
        self.report.as_ref()
    }

    pub fn into_report(self) -> Option<ImportReport> {
        self.report
    }

    pub fn into_collaborators(self) -> Collaborators<D, R, G> {
        self.collaborators
    }

    pub fn prev_step(&mut self) -> Transition {
        let transition = self.stepper.prev_step();
        self.on_transition(transition);
        transition
    }

    /// Checks the active step and moves on if it passes.
    pub async fn next_step(&mut self) -> Transition {
        let transition = match self.stepper.request_next() {
            NextRequest::Busy => Transition::Stayed,
            NextRequest::Advanced(transition) => transition,
            NextRequest::Gate(ticket) => {
                let result = match ImportStep::from_index(ticket.step()) {
                    Some(step) => self.step_result(step).await,
                    None => StepResult::failed(),
                };
                self.stepper.resolve(ticket, result)
            }
        };
        self.on_transition(transition);
        transition
    }

    /// Runs `next_step` until the import finishes or a step fails.
    pub async fn run_to_end(&mut self) -> Result<&ImportReport> {
        while !self.stepper.is_finished() {
            if self.next_step().await == Transition::Stayed {
                let step = self.active_step().map_or("import", ImportStep::label);
                return Err(self
                    .take_last_error()
                    .unwrap_or(ImportError::StepIncomplete { step }));
            }
        }
        self.report.as_ref().ok_or(ImportError::StepIncomplete {
            step: ImportStep::ConfigureTest.label(),
        })
    }

    fn on_transition(&mut self, transition: Transition) {
        if let Transition::Moved { from, to } = transition {
            self.stepper.release_gate(from);
            self.stepper.claim_gate(to);
        }
    }

    async fn step_result(&mut self, step: ImportStep) -> StepResult {
        match self.check_step(step).await {
            Ok(()) => {
                self.last_error = None;
                StepResult::advance()
            }
            Err(err) => {
                tracing::warn!(step = step.label(), error = %err, "Step not completed");
                self.last_error = Some(err);
                StepResult::failed()
            }
        }
    }

    async fn check_step(&mut self, step: ImportStep) -> Result<()> {
        match step {
            ImportStep::Upload => {
                if self.context.dataset().is_none() {
                    return Err(ImportError::NoDataset);
                }
                Ok(())
            }
            ImportStep::MapColumns => {
                self.context.mapping().ensure_valid()?;
                let students = self
                    .collaborators
                    .students
                    .list_students()
                    .await
                    .map_err(ImportError::StudentDirectory)?;
                let dropped = self.context.reconcile(&students)?;
                if !dropped.is_empty() {
                    tracing::info!(
                        dropped = dropped.len(),
                        "Manual assignments dropped after reload"
                    );
                }
                Ok(())
            }
            ImportStep::AssignStudents => {
                if self.context.reconciliation().is_none() {
                    return Err(ImportError::NotReconciled);
                }
                self.seed_draft()
            }
            ImportStep::ConfigureTest => self.submit().await,
        }
    }

    /// Makes sure a draft exists that fits the mapped exercise columns.
    ///
    /// A draft of a stored test only needs the same number of columns. An
    /// inferred draft is inferred again whenever the columns change.
    fn seed_draft(&mut self) -> Result<()> {
        let dataset = self.context.dataset().ok_or(ImportError::NoDataset)?;
        let mapped = self.context.mapped_columns();
        let columns = mapped.many(fields::EXERCISES).unwrap_or_default();

        if let (TestTarget::Edit(_), Some(draft)) = (&self.target, &self.draft) {
            if draft.exercises.len() == columns.len() {
                return Ok(());
            }
            return Err(GradingError::ExerciseCountMismatch {
                columns: columns.len(),
                exercises: draft.exercises.len(),
            }
            .into());
        }
        if self.draft.is_some() && self.draft_columns.as_slice() == columns {
            return Ok(());
        }
        if self.draft.is_some() {
            tracing::info!(
                exercises = columns.len(),
                "Exercise columns changed; grading scheme inferred again"
            );
        }
        self.draft_columns = columns.to_vec();

        let mut draft = infer_draft(dataset, mapped, self.defaults);
        if let Some(previous) = &self.draft {
            draft.short_test_no = previous.short_test_no;
            draft.percentage_needed = previous.percentage_needed;
        }
        self.draft = Some(draft);
        Ok(())
    }

    async fn submit(&mut self) -> Result<()> {
        let draft = self.draft.as_ref().ok_or(ImportError::NoDraft)?;
        let definition = draft.to_definition()?;
        let dataset = self.context.dataset().ok_or(ImportError::NoDataset)?;
        let reconciliation = self
            .context
            .reconciliation()
            .ok_or(ImportError::NotReconciled)?;

        let orchestrator =
            SubmissionOrchestrator::new(&self.collaborators.tests, &self.collaborators.gradings);
        let submitted = orchestrator
            .submit(
                &self.target,
                &definition,
                GradingSource {
                    dataset,
                    mapped: self.context.mapped_columns(),
                    reconciliation,
                },
            )
            .await;
        let submitted = match submitted {
            Ok(submitted) => submitted,
            Err(err) => {
                // A retry must not create the saved test a second time.
                if let Some(saved) = err.saved_test() {
                    self.adopt_saved_test(saved);
                }
                return Err(err.into());
            }
        };

        let created = self.target == TestTarget::Create;
        let report = ImportReport::new(submitted, created, reconciliation);
        tracing::info!(
            test = %report.test.id,
            graded = report.graded.len(),
            warnings = report.warnings.len(),
            "Import committed"
        );
        // Later runs of this wizard edit the test that now exists.
        let test = report.test.clone();
        self.adopt_saved_test(&test);
        self.report = Some(report);
        Ok(())
    }

    /// Points later submissions at `test` and gives the draft its ids.
    fn adopt_saved_test(&mut self, test: &ShortTest) {
        self.target = TestTarget::Edit(test.id.clone());
        if let Some(draft) = self.draft.as_mut() {
            for (exercise, saved) in draft.exercises.iter_mut().zip(&test.exercises) {
                exercise.id = Some(saved.id.clone());
            }
        }
    }
}
