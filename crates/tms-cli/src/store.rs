//! JSON file implementations of the import collaborators.
//!
//! Students come from a JSON array. The saved test and the grading batch
//! are written to `short-test.json` and `gradings.json` in the output
//! directory. With `dry_run` nothing is written.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tms_import::{CollaboratorError, GradingSubmitter, StudentDirectory, TestRepository};
use tms_model::{
    Exercise, ExerciseId, GradingDto, ShortTest, ShortTestDefinition, ShortTestId, Student,
    StudentId,
};

pub const SHORT_TEST_FILE: &str = "short-test.json";
pub const GRADINGS_FILE: &str = "gradings.json";

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CollaboratorError> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|err| CollaboratorError::Other(Box::new(err)))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CollaboratorError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content =
        serde_json::to_string_pretty(value).map_err(|err| CollaboratorError::Other(Box::new(err)))?;
    std::fs::write(path, content)?;
    tracing::debug!(path = %path.display(), "Wrote file");
    Ok(())
}

/// Students loaded from a JSON file.
#[derive(Debug, Clone)]
pub struct JsonStudentDirectory {
    students: Vec<Student>,
}

impl JsonStudentDirectory {
    pub fn new(students: Vec<Student>) -> Self {
        Self { students }
    }

    pub fn load(path: &Path) -> Result<Self, CollaboratorError> {
        let students: Vec<Student> = read_json(path)?;
        tracing::info!(count = students.len(), "Loaded students");
        Ok(Self::new(students))
    }
}

impl StudentDirectory for JsonStudentDirectory {
    async fn list_students(&self) -> Result<Vec<Student>, CollaboratorError> {
        Ok(self.students.clone())
    }
}

/// Test repository backed by the output directory.
///
/// Knows at most one test: the one given for edit mode, or the one saved
/// during this run.
#[derive(Debug)]
pub struct FileTestRepository {
    output_dir: PathBuf,
    dry_run: bool,
    current: RefCell<Option<ShortTest>>,
}

impl FileTestRepository {
    pub fn new(output_dir: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            dry_run,
            current: RefCell::new(None),
        }
    }

    /// Repository already holding `test`, for re-imports.
    #[must_use]
    pub fn with_existing(self, test: ShortTest) -> Self {
        *self.current.borrow_mut() = Some(test);
        self
    }

    pub fn load_test(path: &Path) -> Result<ShortTest, CollaboratorError> {
        read_json(path)
    }

    pub fn path(&self) -> PathBuf {
        self.output_dir.join(SHORT_TEST_FILE)
    }

    fn store(
        &self,
        test_id: ShortTestId,
        definition: &ShortTestDefinition,
    ) -> Result<ShortTest, CollaboratorError> {
        let mut exercises = Vec::with_capacity(definition.exercises.len());
        for (index, exercise) in definition.exercises.iter().enumerate() {
            let id = match &exercise.id {
                Some(id) => id.clone(),
                None => ExerciseId::new(format!("{test_id}-ex{}", index + 1))
                    .map_err(|err| CollaboratorError::Other(Box::new(err)))?,
            };
            exercises.push(Exercise {
                id,
                ex_name: exercise.ex_name.clone(),
                max_points: exercise.max_points,
            });
        }

        let test = ShortTest {
            id: test_id,
            short_test_no: definition.short_test_no,
            percentage_needed: definition.percentage_needed,
            exercises,
        };
        if !self.dry_run {
            write_json(&self.path(), &test)?;
        }
        *self.current.borrow_mut() = Some(test.clone());
        Ok(test)
    }
}

impl TestRepository for FileTestRepository {
    async fn create_test(
        &self,
        definition: &ShortTestDefinition,
    ) -> Result<ShortTest, CollaboratorError> {
        let id = ShortTestId::new(format!("short-test-{}", definition.short_test_no))
            .map_err(|err| CollaboratorError::Other(Box::new(err)))?;
        self.store(id, definition)
    }

    async fn edit_test(
        &self,
        id: &ShortTestId,
        definition: &ShortTestDefinition,
    ) -> Result<ShortTest, CollaboratorError> {
        if self.current.borrow().as_ref().is_none_or(|test| &test.id != id) {
            return Err(CollaboratorError::NotFound(id.to_string()));
        }
        self.store(id.clone(), definition)
    }

    async fn get_test(&self, id: &ShortTestId) -> Result<ShortTest, CollaboratorError> {
        self.current
            .borrow()
            .as_ref()
            .filter(|test| &test.id == id)
            .cloned()
            .ok_or_else(|| CollaboratorError::NotFound(id.to_string()))
    }
}

/// Writes the grading batch as one JSON object keyed by student id.
#[derive(Debug)]
pub struct FileGradingSubmitter {
    output_dir: PathBuf,
    dry_run: bool,
}

impl FileGradingSubmitter {
    pub fn new(output_dir: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            dry_run,
        }
    }

    pub fn path(&self) -> PathBuf {
        self.output_dir.join(GRADINGS_FILE)
    }
}

impl GradingSubmitter for FileGradingSubmitter {
    async fn submit_gradings(
        &self,
        gradings: &BTreeMap<StudentId, GradingDto>,
    ) -> Result<(), CollaboratorError> {
        if self.dry_run {
            tracing::info!(count = gradings.len(), "Dry run; gradings not written");
            return Ok(());
        }
        write_json(&self.path(), gradings)
    }
}
