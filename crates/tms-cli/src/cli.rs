//! Command line arguments for `tms`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use tms_ingest::Delimiter;

#[derive(Parser)]
#[command(
    name = "tms",
    version,
    about = "Import short-test results from an e-learning export",
    long_about = "Import short-test results from an e-learning export.\n\n\
                  Maps spreadsheet columns, matches usernames to students, derives\n\
                  the grading scheme and writes the short test and its gradings."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include usernames in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Import a results export and write the short test and gradings.
    Import(ImportArgs),

    /// Show the headers of an export and the columns that would be mapped.
    Inspect(InspectArgs),
}

#[derive(Parser)]
pub struct ImportArgs {
    /// Results export (CSV or TSV).
    #[arg(long = "results", value_name = "CSV")]
    pub results: PathBuf,

    /// Known students as a JSON array.
    #[arg(long = "students", value_name = "JSON")]
    pub students: PathBuf,

    /// Mapping profile (TOML). Unlisted fields are auto-mapped.
    #[arg(long = "mapping", value_name = "TOML")]
    pub mapping: Option<PathBuf>,

    /// Grading scheme overrides (JSON: shortTestNo, percentageNeeded, maxPoints).
    #[arg(long = "test", value_name = "JSON")]
    pub test: Option<PathBuf>,

    /// Re-import into this saved short test (JSON) instead of creating one.
    #[arg(long = "existing-test", value_name = "JSON")]
    pub existing_test: Option<PathBuf>,

    /// Directory for short-test.json and gradings.json.
    #[arg(long = "output", value_name = "DIR")]
    pub output: PathBuf,

    /// Field delimiter (overrides the profile).
    #[arg(long = "delimiter", value_enum)]
    pub delimiter: Option<DelimiterArg>,

    /// Save the column mapping used by this import as a profile (TOML).
    #[arg(long = "save-mapping", value_name = "TOML")]
    pub save_mapping: Option<PathBuf>,

    /// Run every step without writing files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct InspectArgs {
    /// Results export (CSV or TSV).
    #[arg(long = "results", value_name = "CSV")]
    pub results: PathBuf,

    #[arg(long = "delimiter", value_enum, default_value = "auto")]
    pub delimiter: DelimiterArg,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DelimiterArg {
    Auto,
    Comma,
    Semicolon,
    Tab,
}

impl From<DelimiterArg> for Delimiter {
    fn from(arg: DelimiterArg) -> Self {
        match arg {
            DelimiterArg::Auto => Delimiter::Auto,
            DelimiterArg::Comma => Delimiter::Comma,
            DelimiterArg::Semicolon => Delimiter::Semicolon,
            DelimiterArg::Tab => Delimiter::Tab,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
