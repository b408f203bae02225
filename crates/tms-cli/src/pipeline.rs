//! Runs an import from files on disk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tms_grading::DraftDefaults;
use tms_import::{
    Collaborators, GradingSubmitter, ImportError, ImportReport, ImportStep, ImportWizard,
    StudentDirectory, TestRepository, Transition,
};
use tms_ingest::{Delimiter, read_table};
use tms_map::{ColumnMapping, MappedValue, MappingError, short_test_metadata};
use tms_model::{Dataset, ShortTest};

use crate::logging::redact_value;
use crate::profile::{ImportProfile, TestOverrides};
use crate::store::{FileGradingSubmitter, FileTestRepository, JsonStudentDirectory};

/// Everything `tms import` needs.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub results: PathBuf,
    pub students: PathBuf,
    pub output_dir: PathBuf,
    pub profile: ImportProfile,
    pub overrides: TestOverrides,
    /// Re-import into this test instead of creating one.
    pub existing_test: Option<ShortTest>,
    /// Overrides the profile's delimiter.
    pub delimiter: Option<Delimiter>,
    pub dry_run: bool,
    /// Write the effective column mapping here after a successful import.
    pub save_profile: Option<PathBuf>,
}

#[derive(Debug)]
pub struct ImportOutcome {
    pub report: ImportReport,
    /// Files written, empty on a dry run.
    pub written: Vec<PathBuf>,
    pub dry_run: bool,
}

/// Reads the inputs, drives the wizard to the end and writes the outputs.
pub async fn run_import(options: &ImportOptions) -> Result<ImportOutcome> {
    let delimiter = options.delimiter.unwrap_or(options.profile.delimiter);
    let table = read_table(&options.results, delimiter)
        .with_context(|| format!("read results: {}", options.results.display()))?;
    let directory = JsonStudentDirectory::load(&options.students)
        .with_context(|| format!("read students: {}", options.students.display()))?;

    let mut tests = FileTestRepository::new(&options.output_dir, options.dry_run);
    if let Some(test) = &options.existing_test {
        tests = tests.with_existing(test.clone());
    }
    let submitter = FileGradingSubmitter::new(&options.output_dir, options.dry_run);
    let written = if options.dry_run {
        Vec::new()
    } else {
        vec![tests.path(), submitter.path()]
    };

    let collaborators = Collaborators {
        students: directory,
        tests,
        gradings: submitter,
    };
    let mut wizard = match &options.existing_test {
        Some(test) => ImportWizard::for_existing_test(collaborators, test.id.clone())
            .await
            .context("load existing short test")?,
        None => ImportWizard::new(collaborators, draft_defaults(&options.profile)),
    };

    let outcome = wizard.upload(table).context("load results")?;
    tracing::info!(
        rows = outcome.rows,
        auto_mapped = outcome.auto_mapped_fields.len(),
        "Results loaded"
    );
    wizard
        .context_mut()
        .mapping_mut()
        .apply_profile(options.profile.column_assignments())
        .context("apply mapping profile")?;

    advance_to(&mut wizard, ImportStep::ConfigureTest).await?;
    log_unmatched(&wizard);
    let effective_profile = ImportProfile {
        delimiter,
        ..options.profile.with_columns(wizard.mapped_columns())
    };

    if let Some(draft) = wizard.draft_mut() {
        let unknown = options.overrides.apply(draft);
        for name in unknown {
            tracing::warn!(exercise = %name, "Override names no exercise; ignored");
        }
    }
    advance_to_end(&mut wizard).await?;

    let report = wizard
        .into_report()
        .ok_or_else(|| anyhow!("import finished without a report"))?;
    let mut written = written;
    if let Some(path) = &options.save_profile {
        effective_profile.save(path)?;
        tracing::info!(path = %path.display(), "Mapping profile saved");
        written.push(path.clone());
    }
    Ok(ImportOutcome {
        report,
        written,
        dry_run: options.dry_run,
    })
}

fn draft_defaults(profile: &ImportProfile) -> DraftDefaults {
    let defaults = DraftDefaults::default();
    DraftDefaults {
        short_test_no: profile.short_test_no.unwrap_or(defaults.short_test_no),
        percentage_needed: profile
            .percentage_needed
            .unwrap_or(defaults.percentage_needed),
    }
}

async fn advance_to<D, R, G>(wizard: &mut ImportWizard<D, R, G>, target: ImportStep) -> Result<()>
where
    D: StudentDirectory,
    R: TestRepository,
    G: GradingSubmitter,
{
    while let Some(step) = wizard.active_step() {
        if step == target {
            return Ok(());
        }
        step_once(wizard, step).await?;
    }
    Ok(())
}

async fn advance_to_end<D, R, G>(wizard: &mut ImportWizard<D, R, G>) -> Result<()>
where
    D: StudentDirectory,
    R: TestRepository,
    G: GradingSubmitter,
{
    while let Some(step) = wizard.active_step() {
        step_once(wizard, step).await?;
    }
    Ok(())
}

async fn step_once<D, R, G>(wizard: &mut ImportWizard<D, R, G>, step: ImportStep) -> Result<()>
where
    D: StudentDirectory,
    R: TestRepository,
    G: GradingSubmitter,
{
    if wizard.next_step().await != Transition::Stayed {
        return Ok(());
    }
    let err = wizard
        .take_last_error()
        .unwrap_or(ImportError::StepIncomplete { step: step.label() });
    let detail = describe(&err);
    Err(anyhow::Error::new(err).context(format!("{} failed{detail}", step.label())))
}

/// Extra lines for errors whose summary hides the details.
fn describe(err: &ImportError) -> String {
    match err {
        ImportError::Mapping(MappingError::Invalid { issues }) => issues
            .iter()
            .map(|issue| format!("\n  - {issue}"))
            .collect(),
        ImportError::Submission(submission) => format!(" at '{}'", submission.stage()),
        _ => String::new(),
    }
}

fn log_unmatched<D, R, G>(wizard: &ImportWizard<D, R, G>)
where
    D: StudentDirectory,
    R: TestRepository,
    G: GradingSubmitter,
{
    let Some(reconciliation) = wizard.reconciliation() else {
        return;
    };
    let summary = reconciliation.summary();
    tracing::info!(
        matched = summary.matched,
        unmatched_names = summary.unmatched_names,
        unmatched_students = summary.unmatched_students,
        "Usernames matched"
    );
    for name in reconciliation.unmatched_names() {
        tracing::debug!(username = redact_value(name), "No student for username");
    }
}

/// Headers of an export and the columns auto-mapping would pick.
#[derive(Debug, Clone)]
pub struct Inspection {
    pub headers: Vec<String>,
    pub rows: usize,
    /// One entry per mapping field, in declaration order.
    pub fields: Vec<InspectedField>,
}

#[derive(Debug, Clone)]
pub struct InspectedField {
    pub name: String,
    pub label: String,
    pub required: bool,
    pub dynamic: bool,
    pub mapped: Option<MappedValue>,
}

pub fn inspect(path: &Path, delimiter: Delimiter) -> Result<Inspection> {
    let table =
        read_table(path, delimiter).with_context(|| format!("read results: {}", path.display()))?;
    let dataset = Dataset::ingest(table).context("load results")?;

    let mut mapping = ColumnMapping::new(short_test_metadata());
    mapping.auto_map(dataset.headers());

    let fields = mapping
        .metadata()
        .fields()
        .iter()
        .map(|field| InspectedField {
            name: field.name.clone(),
            label: field.descriptor.label().to_string(),
            required: field.descriptor.is_required(),
            dynamic: field.descriptor.is_dynamic(),
            mapped: mapping.mapped_columns().get(&field.name).cloned(),
        })
        .collect();

    Ok(Inspection {
        headers: dataset.headers().to_vec(),
        rows: dataset.len(),
        fields,
    })
}
