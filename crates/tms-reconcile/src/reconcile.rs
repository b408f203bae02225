//! Username reconciliation with manual overrides.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tms_model::{Dataset, Student, StudentId};

use crate::mapping::IliasNameMapping;

/// A user decision that survives recomputation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Override {
    /// The username was assigned to this student by hand.
    Assigned(StudentId),
    /// An automatic match for the username was removed by hand.
    Cleared,
}

/// Outcome of matching one dataset against the student list.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    mapping: IliasNameMapping,
    overrides: BTreeMap<String, Override>,
    dataset_names: BTreeSet<String>,
    students: Vec<Student>,
    unmatched_names: Vec<String>,
    unmatched_students: Vec<Student>,
}

/// Counts for status displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub matched: usize,
    pub unmatched_names: usize,
    pub unmatched_students: usize,
    pub overrides: usize,
}

/// Matches the usernames in `ilias_name_column` against `students`.
///
/// Every row with a non-empty cell is looked up by exact `ilias_name`
/// equality. Rows without a match are reported in `unmatched_names`
/// (sorted, each name once); students no row claimed end up in
/// `unmatched_students`.
pub fn reconcile(dataset: &Dataset, ilias_name_column: &str, students: &[Student]) -> Reconciliation {
    let mut index: HashMap<&str, &Student> = HashMap::with_capacity(students.len());
    for student in students {
        let Some(name) = student.ilias_name.as_deref().filter(|n| !n.is_empty()) else {
            continue;
        };
        if index.contains_key(name) {
            tracing::warn!(student = %student.id, "Two students share a username; keeping the first");
            continue;
        }
        index.insert(name, student);
    }

    let mut mapping = IliasNameMapping::new();
    let mut dataset_names = BTreeSet::new();
    for row in dataset.rows() {
        let name = row.cell(ilias_name_column);
        if name.is_empty() {
            continue;
        }
        dataset_names.insert(name.to_string());
        if let Some(student) = index.get(name) {
            mapping.add_mapping(name, (*student).clone());
        } else {
            tracing::debug!(row = row.row_nr, "No student for username");
        }
    }

    let mut reconciliation = Reconciliation {
        mapping,
        overrides: BTreeMap::new(),
        dataset_names,
        students: students.to_vec(),
        unmatched_names: Vec::new(),
        unmatched_students: Vec::new(),
    };
    reconciliation.update_derived();

    tracing::info!(
        matched = reconciliation.mapping.len(),
        unmatched_names = reconciliation.unmatched_names.len(),
        unmatched_students = reconciliation.unmatched_students.len(),
        "Reconciled usernames"
    );
    reconciliation
}

impl Reconciliation {
    pub fn mapping(&self) -> &IliasNameMapping {
        &self.mapping
    }

    /// Usernames in the dataset without a student, ascending.
    pub fn unmatched_names(&self) -> &[String] {
        &self.unmatched_names
    }

    /// Students no username is assigned to, in directory order.
    pub fn unmatched_students(&self) -> &[Student] {
        &self.unmatched_students
    }

    pub fn get_mapping(&self, username: &str) -> Option<&Student> {
        self.mapping.get_mapping(username)
    }

    /// Assigns `student` to `username` by hand.
    ///
    /// Another username holding the same student loses it. The decision is
    /// kept as an override across [`Reconciliation::refresh`].
    pub fn add_mapping(&mut self, username: &str, student: Student) {
        let id = student.id.clone();
        if let Some(previous) = self.mapping.add_mapping(username, student) {
            // The displaced username must not get the student back from an
            // older override.
            if self.overrides.get(&previous) == Some(&Override::Assigned(id.clone())) {
                self.overrides.remove(&previous);
            }
        }
        self.overrides
            .insert(username.to_string(), Override::Assigned(id));
        self.update_derived();
    }

    /// Removes the assignment of `username` by hand.
    pub fn remove_mapping(&mut self, username: &str) -> Option<Student> {
        let removed = self.mapping.remove_mapping(username);
        self.overrides.insert(username.to_string(), Override::Cleared);
        self.update_derived();
        removed
    }

    pub fn is_manual(&self, username: &str) -> bool {
        self.overrides.contains_key(username)
    }

    pub fn overrides(&self) -> &BTreeMap<String, Override> {
        &self.overrides
    }

    /// Recomputes against new inputs and merges earlier overrides.
    ///
    /// An override is kept while its username still occurs in the dataset
    /// and, for assignments, its student is still in `students` (the fresh
    /// record is used). Kept overrides take precedence over automatic
    /// matches. Returns the usernames whose overrides were dropped.
    pub fn refresh(
        &mut self,
        dataset: &Dataset,
        ilias_name_column: &str,
        students: &[Student],
    ) -> Vec<String> {
        let mut fresh = reconcile(dataset, ilias_name_column, students);
        let by_id: HashMap<&StudentId, &Student> = students.iter().map(|s| (&s.id, s)).collect();
        let mut dropped = Vec::new();

        for (username, decision) in std::mem::take(&mut self.overrides) {
            if !fresh.dataset_names.contains(&username) {
                dropped.push(username);
                continue;
            }
            match &decision {
                Override::Assigned(id) => match by_id.get(id) {
                    Some(student) => {
                        fresh.mapping.add_mapping(&username, (*student).clone());
                    }
                    None => {
                        dropped.push(username);
                        continue;
                    }
                },
                Override::Cleared => {
                    fresh.mapping.remove_mapping(&username);
                }
            }
            fresh.overrides.insert(username, decision);
        }

        fresh.update_derived();
        if !dropped.is_empty() {
            tracing::info!(count = dropped.len(), "Dropped manual assignments that no longer apply");
        }
        *self = fresh;
        dropped
    }

    pub fn summary(&self) -> ReconcileSummary {
        ReconcileSummary {
            matched: self.mapping.len(),
            unmatched_names: self.unmatched_names.len(),
            unmatched_students: self.unmatched_students.len(),
            overrides: self.overrides.len(),
        }
    }

    fn update_derived(&mut self) {
        self.unmatched_names = self
            .dataset_names
            .iter()
            .filter(|name| self.mapping.get_mapping(name).is_none())
            .cloned()
            .collect();

        let claimed: BTreeSet<&StudentId> = self.mapping.iter().map(|(_, s)| &s.id).collect();
        self.unmatched_students = self
            .students
            .iter()
            .filter(|student| !claimed.contains(&student.id))
            .cloned()
            .collect();
    }
}
