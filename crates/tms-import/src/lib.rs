//! Short-test result import workflow.
//!
//! [`ImportWizard`] owns one import: the uploaded spreadsheet, the column
//! mapping, the username reconciliation and the grading scheme draft. It
//! walks the user through four gated steps on a [`Stepper`] and finally
//! commits the test and its gradings through the collaborator traits.

#![deny(unsafe_code)]

mod collaborators;
mod context;
mod error;
mod stepper;
mod submission;
mod wizard;

pub use collaborators::{Collaborators, GradingSubmitter, StudentDirectory, TestRepository};
pub use context::{ImportContext, IngestOutcome};
pub use error::{CollaboratorError, ImportError, Result, SubmissionError};
pub use stepper::{
    ExitReason, GateTicket, NextRequest, StepDescriptor, StepResult, Stepper, Transition,
};
pub use submission::{GradingSource, SubmissionOrchestrator, Submitted, TestTarget};
pub use wizard::{GradedStudent, ImportReport, ImportStep, ImportWizard};
