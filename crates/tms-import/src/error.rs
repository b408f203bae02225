//! Error types for the import workflow.

use thiserror::Error;
use tms_grading::GradingError;
use tms_map::MappingError;
use tms_model::{ModelError, ShortTest, ShortTestId};

/// Failure reported by an external collaborator.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend refused the request.
    #[error("rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Fatal submission failure, naming the sub-step that failed.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// Creating or editing the short test failed. Nothing was written.
    #[error("failed to save short test")]
    TestWrite {
        #[source]
        source: CollaboratorError,
    },

    /// The saved test does not fit the mapped columns.
    #[error("gradings could not be built for saved short test {}", .test.id)]
    GradingBuild {
        test: Box<ShortTest>,
        #[source]
        source: GradingError,
    },

    /// The test was saved but the gradings were not.
    #[error("short test {} was saved but submitting gradings failed", .test.id)]
    GradingSubmit {
        test: Box<ShortTest>,
        #[source]
        source: CollaboratorError,
    },
}

impl SubmissionError {
    /// Name of the failed sub-step for user-facing messages.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::TestWrite { .. } => "save short test",
            Self::GradingBuild { .. } => "build gradings",
            Self::GradingSubmit { .. } => "submit gradings",
        }
    }

    /// The test as persisted before the failure, if it got that far.
    pub fn saved_test(&self) -> Option<&ShortTest> {
        match self {
            Self::TestWrite { .. } => None,
            Self::GradingBuild { test, .. } | Self::GradingSubmit { test, .. } => Some(&**test),
        }
    }
}

/// Errors that keep a wizard step from completing.
#[derive(Debug, Error)]
pub enum ImportError {
    /// A step that needs the spreadsheet ran before one was uploaded.
    #[error("no spreadsheet has been uploaded")]
    NoDataset,

    #[error("invalid spreadsheet: {0}")]
    Dataset(#[from] ModelError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Grading(#[from] GradingError),

    /// Students assignment has not happened yet.
    #[error("usernames have not been matched to students")]
    NotReconciled,

    /// The grading scheme has not been seeded yet.
    #[error("no grading scheme to submit")]
    NoDraft,

    #[error("failed to load students")]
    StudentDirectory(#[source] CollaboratorError),

    #[error("failed to load short test {id}")]
    TestLookup {
        id: ShortTestId,
        #[source]
        source: CollaboratorError,
    },

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// A step stayed active without reporting why.
    #[error("step '{step}' was not completed")]
    StepIncomplete { step: &'static str },
}

/// Result type for import operations.
pub type Result<T> = std::result::Result<T, ImportError>;
