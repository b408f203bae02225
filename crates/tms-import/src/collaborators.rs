//! Services the wizard calls out to.
//!
//! The futures run on a single-threaded runtime, so the traits use native
//! `async fn` without `Send` bounds.
#![allow(async_fn_in_trait)]

use std::collections::BTreeMap;

use tms_model::{GradingDto, ShortTest, ShortTestDefinition, ShortTestId, Student, StudentId};

use crate::error::CollaboratorError;

/// Source of known student records.
pub trait StudentDirectory {
    async fn list_students(&self) -> Result<Vec<Student>, CollaboratorError>;
}

/// Persistence for short tests.
pub trait TestRepository {
    /// Stores a new test and returns it with assigned ids.
    async fn create_test(
        &self,
        definition: &ShortTestDefinition,
    ) -> Result<ShortTest, CollaboratorError>;

    /// Replaces an existing test. Exercises carrying an id are updated.
    async fn edit_test(
        &self,
        id: &ShortTestId,
        definition: &ShortTestDefinition,
    ) -> Result<ShortTest, CollaboratorError>;

    async fn get_test(&self, id: &ShortTestId) -> Result<ShortTest, CollaboratorError>;
}

/// Batch endpoint for gradings.
pub trait GradingSubmitter {
    async fn submit_gradings(
        &self,
        gradings: &BTreeMap<StudentId, GradingDto>,
    ) -> Result<(), CollaboratorError>;
}

/// The services one wizard works with.
#[derive(Debug, Clone)]
pub struct Collaborators<D, R, G> {
    pub students: D,
    pub tests: R,
    pub gradings: G,
}
