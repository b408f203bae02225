use std::collections::BTreeMap;

use proptest::prelude::*;
use tms_model::{Dataset, ParsedTable, Student, StudentId};
use tms_reconcile::{Override, reconcile};

fn dataset(logins: &[&str]) -> Dataset {
    Dataset::ingest(ParsedTable {
        headers: vec!["Login".to_string(), "1".to_string()],
        rows: logins
            .iter()
            .map(|login| {
                let mut row = BTreeMap::new();
                row.insert("Login".to_string(), (*login).to_string());
                row.insert("1".to_string(), "5".to_string());
                row
            })
            .collect(),
    })
    .expect("ingest")
}

fn student(id: &str, ilias: Option<&str>) -> Student {
    let student = Student::new(StudentId::new(id).unwrap());
    match ilias {
        Some(name) => student.with_ilias_name(name),
        None => student,
    }
}

fn ids(students: &[Student]) -> Vec<&str> {
    students.iter().map(|s| s.id.as_str()).collect()
}

#[test]
fn matches_exact_usernames() {
    let students = vec![
        student("s1", Some("jdoe")),
        student("s2", Some("mmuster")),
        student("s3", None),
    ];
    let result = reconcile(&dataset(&["jdoe", "zed", "", "JDOE", "abe"]), "Login", &students);

    assert_eq!(result.get_mapping("jdoe").map(|s| s.id.as_str()), Some("s1"));
    assert!(result.get_mapping("JDOE").is_none());
    assert_eq!(result.unmatched_names(), &["JDOE", "abe", "zed"]);
    assert_eq!(ids(result.unmatched_students()), vec!["s2", "s3"]);
    assert_eq!(result.mapping().len(), 1);
}

#[test]
fn repeated_usernames_map_once() {
    let students = vec![student("s1", Some("jdoe"))];
    let result = reconcile(&dataset(&["jdoe", "jdoe"]), "Login", &students);
    assert_eq!(result.mapping().len(), 1);
    assert!(result.unmatched_students().is_empty());
}

#[test]
fn manual_assignment_moves_student() {
    let students = vec![student("s1", Some("jdoe")), student("s2", None)];
    let mut result = reconcile(&dataset(&["jdoe", "john.doe"]), "Login", &students);
    assert_eq!(result.unmatched_names(), &["john.doe"]);

    result.add_mapping("john.doe", students[0].clone());

    assert!(result.get_mapping("jdoe").is_none());
    assert_eq!(
        result.get_mapping("john.doe").map(|s| s.id.as_str()),
        Some("s1")
    );
    assert_eq!(result.unmatched_names(), &["jdoe"]);
    assert_eq!(ids(result.unmatched_students()), vec!["s2"]);
    assert!(result.is_manual("john.doe"));
}

#[test]
fn overrides_survive_refresh_while_valid() {
    let students = vec![student("s1", Some("jdoe")), student("s2", None)];
    let mut result = reconcile(&dataset(&["jdoe", "other"]), "Login", &students);
    result.add_mapping("other", students[1].clone());
    result.remove_mapping("jdoe");
    assert_eq!(result.summary().overrides, 2);

    // Same inputs again: both decisions still apply.
    let dropped = result.refresh(&dataset(&["jdoe", "other"]), "Login", &students);
    assert!(dropped.is_empty());
    assert!(result.get_mapping("jdoe").is_none());
    assert_eq!(result.get_mapping("other").map(|s| s.id.as_str()), Some("s2"));
    assert_eq!(result.overrides().get("jdoe"), Some(&Override::Cleared));
}

#[test]
fn overrides_drop_when_username_or_student_disappears() {
    let students = vec![student("s1", Some("jdoe")), student("s2", None)];
    let mut result = reconcile(&dataset(&["jdoe", "other", "third"]), "Login", &students);
    result.add_mapping("other", students[1].clone());
    result.remove_mapping("jdoe");

    // "jdoe" left the dataset, s2 left the directory.
    let remaining = vec![student("s1", Some("jdoe"))];
    let mut dropped = result.refresh(&dataset(&["other", "third"]), "Login", &remaining);
    dropped.sort();

    assert_eq!(dropped, vec!["jdoe".to_string(), "other".to_string()]);
    assert!(result.get_mapping("other").is_none());
    assert_eq!(result.unmatched_names(), &["other", "third"]);
    assert_eq!(result.summary().overrides, 0);
}

#[test]
fn refresh_uses_fresh_student_records() {
    let students = vec![student("s1", None)];
    let mut result = reconcile(&dataset(&["jdoe"]), "Login", &students);
    result.add_mapping("jdoe", students[0].clone());

    let renamed = vec![student("s1", None).with_name("Jane", "Doe")];
    result.refresh(&dataset(&["jdoe"]), "Login", &renamed);

    assert_eq!(
        result.get_mapping("jdoe").map(Student::display_name),
        Some("Doe, Jane".to_string())
    );
}

proptest! {
    #[test]
    fn one_username_per_student(assignments in prop::collection::vec((0usize..6, 0usize..4), 0..40)) {
        let students: Vec<Student> = (0..4).map(|i| student(&format!("s{i}"), None)).collect();
        let names: Vec<String> = (0..6).map(|i| format!("user{i}")).collect();
        let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut result = reconcile(&dataset(&name_refs), "Login", &students);

        for (name_idx, student_idx) in assignments {
            result.add_mapping(&names[name_idx], students[student_idx].clone());
            prop_assert_eq!(
                result.get_mapping(&names[name_idx]).map(|s| s.id.clone()),
                Some(students[student_idx].id.clone())
            );
        }

        let mut seen = std::collections::BTreeSet::new();
        for (_, s) in result.mapping().iter() {
            prop_assert!(seen.insert(s.id.clone()));
        }
        prop_assert_eq!(
            result.unmatched_names().len() + result.mapping().len(),
            names.len()
        );
    }
}
