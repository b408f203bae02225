use anyhow::{Context, Result};
use tracing::info_span;

use tms_cli::pipeline::{ImportOptions, ImportOutcome, Inspection, inspect, run_import};
use tms_cli::profile::{ImportProfile, TestOverrides};
use tms_cli::store::FileTestRepository;

use crate::cli::{ImportArgs, InspectArgs};

pub fn run_import_command(args: &ImportArgs) -> Result<ImportOutcome> {
    let span = info_span!("import", results = %args.results.display());
    let _guard = span.enter();

    let profile = match &args.mapping {
        Some(path) => ImportProfile::load(path)?,
        None => ImportProfile::default(),
    };
    let overrides = match &args.test {
        Some(path) => TestOverrides::load(path)?,
        None => TestOverrides::default(),
    };
    let existing_test = args
        .existing_test
        .as_deref()
        .map(|path| {
            FileTestRepository::load_test(path)
                .with_context(|| format!("read existing short test: {}", path.display()))
        })
        .transpose()?;

    let options = ImportOptions {
        results: args.results.clone(),
        students: args.students.clone(),
        output_dir: args.output.clone(),
        profile,
        overrides,
        existing_test,
        delimiter: args.delimiter.map(Into::into),
        dry_run: args.dry_run,
        save_profile: args.save_mapping.clone(),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .context("start runtime")?;
    runtime.block_on(run_import(&options))
}

pub fn run_inspect_command(args: &InspectArgs) -> Result<Inspection> {
    inspect(&args.results, args.delimiter.into())
}
