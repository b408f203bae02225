use std::collections::BTreeMap;

use proptest::prelude::*;
use tms_grading::{
    DraftDefaults, GradingBuilder, GradingError, RowOutcome, WarningKind, infer_draft,
    parse_points,
};
use tms_map::{ColumnMapping, fields, short_test_metadata};
use tms_model::{
    Dataset, Exercise, ExerciseId, ParsedTable, ShortTest, ShortTestId, Student, StudentId,
};
use tms_reconcile::reconcile;

const HEADERS: [&str; 5] = [
    "Login",
    "Testergebnis in Punkten",
    "Maximal erreichbare Punktezahl",
    "1",
    "2",
];

fn row(values: [&str; 5]) -> BTreeMap<String, String> {
    HEADERS
        .iter()
        .zip(values)
        .map(|(h, v)| ((*h).to_string(), v.to_string()))
        .collect()
}

fn dataset(rows: Vec<[&str; 5]>) -> Dataset {
    Dataset::ingest(ParsedTable {
        headers: HEADERS.iter().map(|h| (*h).to_string()).collect(),
        rows: rows.into_iter().map(row).collect(),
    })
    .expect("ingest")
}

fn scenario_mapping() -> ColumnMapping {
    let mut mapping = ColumnMapping::new(short_test_metadata());
    mapping.map_column(fields::ILIAS_NAME, "Login");
    mapping.map_column(fields::TEST_RESULT_STUDENT, "Testergebnis in Punkten");
    mapping.map_column(fields::TEST_MAXIMUM_POINTS, "Maximal erreichbare Punktezahl");
    mapping.map_column(fields::EXERCISES, vec!["1", "2"]);
    mapping
}

fn short_test() -> ShortTest {
    ShortTest {
        id: ShortTestId::new("st-1").unwrap(),
        short_test_no: 1,
        percentage_needed: 0.5,
        exercises: vec![
            Exercise {
                id: ExerciseId::new("ex1").unwrap(),
                ex_name: "1".to_string(),
                max_points: 10.0,
            },
            Exercise {
                id: ExerciseId::new("ex2").unwrap(),
                ex_name: "2".to_string(),
                max_points: 10.0,
            },
        ],
    }
}

fn jdoe() -> Student {
    Student::new(StudentId::new("s1").unwrap()).with_ilias_name("jdoe")
}

#[test]
fn end_to_end_scenario() {
    let data = dataset(vec![["jdoe", "18,5", "20", "8,5", "10"]]);
    let mapping = scenario_mapping();
    let students = vec![jdoe()];

    let reconciliation = reconcile(&data, "Login", &students);
    assert_eq!(
        reconciliation.get_mapping("jdoe").map(|s| s.id.as_str()),
        Some("s1")
    );

    let test = short_test();
    let builder =
        GradingBuilder::from_mapping(mapping.mapped_columns(), &reconciliation, &test).unwrap();
    let (student, grading) = builder.build_grading(&data.rows()[0]).expect("graded");

    assert_eq!(student.id.as_str(), "s1");
    assert_eq!(grading.exercise_gradings.len(), 2);
    assert_eq!(grading.points_for(&ExerciseId::new("ex1").unwrap()), Some(8.5));
    assert_eq!(grading.points_for(&ExerciseId::new("ex2").unwrap()), Some(10.0));
    assert!(grading.create_new_grading);

    // The exported total matches the exercise sum, so nothing is reported.
    let batch = builder.build_all(&data);
    assert!(batch.warnings.is_empty());
}

#[test]
fn empty_login_row_is_dropped_silently() {
    let data = dataset(vec![["", "18,5", "20", "8,5", "10"]]);
    let mapping = scenario_mapping();
    let reconciliation = reconcile(&data, "Login", &[jdoe()]);
    let test = short_test();
    let builder =
        GradingBuilder::from_mapping(mapping.mapped_columns(), &reconciliation, &test).unwrap();

    assert_eq!(
        builder.build_row(&data.rows()[0]),
        RowOutcome::SkippedEmptyUsername
    );
    let batch = builder.build_all(&data);
    assert!(batch.gradings.is_empty());
    assert!(batch.warnings.is_empty());
    assert_eq!(batch.skipped_empty, 1);
}

#[test]
fn one_grading_per_row_with_username() {
    let data = dataset(vec![
        ["a", "3", "20", "1", "2"],
        ["", "3", "20", "1", "2"],
        ["b", "7", "20", "3,5", "3,5"],
        ["", "", "", "", ""],
        ["c", "0", "20", "0", "0"],
    ]);
    let students: Vec<Student> = ["a", "b", "c"]
        .iter()
        .map(|name| Student::new(StudentId::new(format!("id-{name}")).unwrap()).with_ilias_name(*name))
        .collect();
    let reconciliation = reconcile(&data, "Login", &students);
    let mapping = scenario_mapping();
    let test = short_test();
    let builder =
        GradingBuilder::from_mapping(mapping.mapped_columns(), &reconciliation, &test).unwrap();

    let batch = builder.build_all(&data);
    assert_eq!(batch.gradings.len(), 3);
    assert_eq!(batch.skipped_empty, 2);
    assert_eq!(batch.students.len(), 3);
}

#[test]
fn bad_cells_become_zero_with_warning() {
    let data = dataset(vec![["jdoe", "", "20", "abc", ""]]);
    let reconciliation = reconcile(&data, "Login", &[jdoe()]);
    let mapping = scenario_mapping();
    let test = short_test();
    let builder =
        GradingBuilder::from_mapping(mapping.mapped_columns(), &reconciliation, &test).unwrap();

    let RowOutcome::Graded {
        grading, warnings, ..
    } = builder.build_row(&data.rows()[0])
    else {
        panic!("row should be graded");
    };
    assert_eq!(grading.total_points(), 0.0);
    assert_eq!(warnings.len(), 2);
    assert_eq!(
        warnings[0].kind,
        WarningKind::InvalidPoints {
            column: "1".to_string(),
            value: "abc".to_string()
        }
    );
    assert_eq!(
        warnings[0].to_string(),
        "row 1: points 'abc' in column '1' counted as 0"
    );
}

#[test]
fn unmatched_username_is_warned_and_skipped() {
    let data = dataset(vec![["ghost", "1", "20", "1", "0"]]);
    let reconciliation = reconcile(&data, "Login", &[jdoe()]);
    let mapping = scenario_mapping();
    let test = short_test();
    let builder =
        GradingBuilder::from_mapping(mapping.mapped_columns(), &reconciliation, &test).unwrap();

    let batch = builder.build_all(&data);
    assert!(batch.gradings.is_empty());
    assert_eq!(batch.skipped_unmatched, 1);
    assert!(matches!(
        &batch.warnings[0].kind,
        WarningKind::UnmatchedUsername { username } if username == "ghost"
    ));
}

#[test]
fn existing_grading_is_patched() {
    let data = dataset(vec![["jdoe", "18,5", "20", "8,5", "10"]]);
    let mut student = jdoe();
    student
        .graded_short_tests
        .insert(ShortTestId::new("st-1").unwrap());
    let reconciliation = reconcile(&data, "Login", &[student]);
    let mapping = scenario_mapping();
    let test = short_test();
    let builder =
        GradingBuilder::from_mapping(mapping.mapped_columns(), &reconciliation, &test).unwrap();

    let (_, grading) = builder.build_grading(&data.rows()[0]).expect("graded");
    assert!(!grading.create_new_grading);
}

#[test]
fn total_mismatch_is_reported() {
    let data = dataset(vec![["jdoe", "19", "20", "8,5", "10"]]);
    let reconciliation = reconcile(&data, "Login", &[jdoe()]);
    let mapping = scenario_mapping();
    let test = short_test();
    let builder =
        GradingBuilder::from_mapping(mapping.mapped_columns(), &reconciliation, &test).unwrap();

    let batch = builder.build_all(&data);
    assert_eq!(batch.gradings.len(), 1);
    assert_eq!(
        batch.warnings[0].kind,
        WarningKind::TotalMismatch {
            exported: 19.0,
            computed: 18.5
        }
    );
}

#[test]
fn column_count_must_match_test() {
    let data = dataset(vec![]);
    let reconciliation = reconcile(&data, "Login", &[]);
    let mut mapping = scenario_mapping();
    mapping.map_column(fields::EXERCISES, vec!["1"]);
    let test = short_test();

    let err = GradingBuilder::from_mapping(mapping.mapped_columns(), &reconciliation, &test)
        .unwrap_err();
    assert_eq!(
        err,
        GradingError::ExerciseCountMismatch {
            columns: 1,
            exercises: 2
        }
    );
}

#[test]
fn draft_is_seeded_from_maximum_column() {
    let data = dataset(vec![
        ["", "", "", "", ""],
        ["jdoe", "18,5", "20", "8,5", "10"],
        ["x", "1", "30", "1", "0"],
    ]);
    let mapping = scenario_mapping();
    let draft = infer_draft(
        &data,
        mapping.mapped_columns(),
        DraftDefaults {
            short_test_no: 4,
            percentage_needed: 0.6,
        },
    );

    assert_eq!(draft.short_test_no, 4);
    assert_eq!(draft.exercises.len(), 2);
    assert_eq!(draft.exercises[0].ex_name, "1");
    assert!(draft.exercises.iter().all(|ex| ex.max_points == 20.0));

    let mut edited = draft.clone();
    edited.exercises[0].max_points = 8.5;
    edited.exercises[1].max_points = 11.5;
    assert_eq!(edited.total_points(), 20.0);
    assert!(edited.to_definition().is_ok());
}

#[test]
fn draft_without_maximum_column_seeds_zero() {
    let data = dataset(vec![["jdoe", "18,5", "20", "8,5", "10"]]);
    let mut mapping = scenario_mapping();
    mapping.clear(fields::TEST_MAXIMUM_POINTS);
    let draft = infer_draft(&data, mapping.mapped_columns(), DraftDefaults::default());
    assert!(draft.exercises.iter().all(|ex| ex.max_points == 0.0));
    assert!(draft.to_definition().is_err());
}

#[test]
fn unreadable_maximum_seeds_zero() {
    let data = dataset(vec![["jdoe", "18,5", "n/a", "8,5", "10"]]);
    let mapping = scenario_mapping();
    let draft = infer_draft(&data, mapping.mapped_columns(), DraftDefaults::default());
    assert_eq!(draft.exercises.len(), 2);
    assert!(draft.exercises.iter().all(|ex| ex.max_points == 0.0));
    assert!(matches!(
        draft.to_definition(),
        Err(GradingError::InvalidMaxPoints { .. })
    ));
}

proptest! {
    #[test]
    fn comma_and_dot_parse_alike(whole in 0u32..10_000, frac in 0u32..100) {
        let dotted = format!("{whole}.{frac:02}");
        let comma = format!("{whole},{frac:02}");
        prop_assert_eq!(parse_points(&dotted).value, parse_points(&comma).value);
        prop_assert!(parse_points(&comma).is_clean());
    }

    #[test]
    fn parse_points_never_panics(cell in ".*") {
        let parsed = parse_points(&cell);
        prop_assert!(parsed.value.is_finite());
        prop_assert_eq!(parsed.problem.is_some(), !parsed.is_clean());
    }
}
