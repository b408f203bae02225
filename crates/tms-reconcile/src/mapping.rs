use std::collections::BTreeMap;

use tms_model::Student;

/// Username to student assignments, at most one username per student.
///
/// The structure itself would allow two keys to share a student; every
/// write goes through [`IliasNameMapping::add_mapping`], which keeps the
/// one-key-per-student rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IliasNameMapping {
    entries: BTreeMap<String, Student>,
}

impl IliasNameMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `student` to `username`.
    ///
    /// A different username already pointing at the same student is removed
    /// first and returned.
    pub fn add_mapping(&mut self, username: &str, student: Student) -> Option<String> {
        let previous = self
            .entries
            .iter()
            .find(|(name, mapped)| mapped.id == student.id && name.as_str() != username)
            .map(|(name, _)| name.clone());

        if let Some(name) = &previous {
            self.entries.remove(name);
        }
        self.entries.insert(username.to_string(), student);
        previous
    }

    pub fn remove_mapping(&mut self, username: &str) -> Option<Student> {
        self.entries.remove(username)
    }

    pub fn get_mapping(&self, username: &str) -> Option<&Student> {
        self.entries.get(username)
    }

    /// The username currently assigned to the student with `id`.
    pub fn username_for(&self, id: &tms_model::StudentId) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, student)| &student.id == id)
            .map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Student)> {
        self.entries.iter().map(|(name, student)| (name.as_str(), student))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
