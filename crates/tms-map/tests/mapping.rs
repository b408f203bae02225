use tms_map::{
    ColumnMapping, MappedColumns, MappedValue, MappingError, fields, short_test_metadata,
    validate,
};

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| (*n).to_string()).collect()
}

fn ilias_headers() -> Vec<String> {
    headers(&[
        "Login",
        "Testergebnis in Punkten",
        "Maximal erreichbare Punktezahl",
        "1",
        "2",
    ])
}

#[test]
fn auto_map_fills_static_fields_only() {
    let mut mapping = ColumnMapping::new(short_test_metadata());
    let filled = mapping.auto_map(&ilias_headers());

    assert_eq!(
        filled,
        vec![
            fields::ILIAS_NAME.to_string(),
            fields::TEST_RESULT_STUDENT.to_string(),
            fields::TEST_MAXIMUM_POINTS.to_string(),
        ]
    );
    let mapped = mapping.mapped_columns();
    assert_eq!(mapped.single(fields::ILIAS_NAME), Some("Login"));
    assert!(!mapped.contains(fields::EXERCISES));
}

#[test]
fn auto_map_ignores_case_and_prefers_candidate_order() {
    let mut mapping = ColumnMapping::new(short_test_metadata());
    mapping.auto_map(&headers(&["USERNAME", "benutzername"]));
    assert_eq!(
        mapping.mapped_columns().single(fields::ILIAS_NAME),
        Some("benutzername")
    );
}

#[test]
fn user_selection_wins_over_auto_map() {
    let mut mapping = ColumnMapping::new(short_test_metadata());
    mapping.map_column(fields::ILIAS_NAME, "Matrikel");
    mapping.auto_map(&ilias_headers());
    assert_eq!(
        mapping.mapped_columns().single(fields::ILIAS_NAME),
        Some("Matrikel")
    );

    mapping.map_column(fields::ILIAS_NAME, "Login");
    assert_eq!(
        mapping.mapped_columns().single(fields::ILIAS_NAME),
        Some("Login")
    );
}

#[test]
fn empty_selection_clears_field() {
    let mut mapping = ColumnMapping::new(short_test_metadata());
    mapping.map_column(fields::ILIAS_NAME, "Login");
    mapping.map_column(fields::ILIAS_NAME, "");
    assert!(!mapping.mapped_columns().contains(fields::ILIAS_NAME));
}

#[test]
fn scenario_mapping_is_valid() {
    let mut mapping = ColumnMapping::new(short_test_metadata());
    mapping.map_column(fields::ILIAS_NAME, "Login");
    mapping.map_column(fields::TEST_RESULT_STUDENT, "Testergebnis in Punkten");
    mapping.map_column(fields::TEST_MAXIMUM_POINTS, "Maximal erreichbare Punktezahl");
    mapping.map_column(fields::EXERCISES, vec!["1", "2"]);

    assert!(mapping.validate().is_empty());
    assert!(mapping.ensure_valid().is_ok());

    let summary = mapping.summary();
    assert_eq!(summary.total_fields, 4);
    assert_eq!(summary.mapped, 4);
    assert_eq!(summary.required_mapped, summary.required_total);
}

#[test]
fn missing_required_fields_block() {
    let mut mapping = ColumnMapping::new(short_test_metadata());
    mapping.map_column(fields::TEST_RESULT_STUDENT, "Testergebnis in Punkten");

    let err = mapping.ensure_valid().unwrap_err();
    let MappingError::Invalid { issues } = err else {
        panic!("expected invalid mapping");
    };
    let fields_with_issues: Vec<&str> = issues.iter().map(|i| i.field()).collect();
    assert_eq!(fields_with_issues, vec![fields::ILIAS_NAME, fields::EXERCISES]);
}

#[test]
fn validate_is_independent_of_state_type() {
    let metadata = short_test_metadata();
    let mut mapped = MappedColumns::new();
    mapped.insert(fields::ILIAS_NAME, MappedValue::from("Login"));
    mapped.insert(fields::EXERCISES, MappedValue::from("1"));
    assert_eq!(validate(&mapped, &metadata).len(), 1);

    // Optional static fields may even hold a list; shape is only checked for
    // dynamic fields.
    mapped.insert(fields::EXERCISES, MappedValue::from(vec!["1"]));
    mapped.insert(fields::TEST_RESULT_STUDENT, MappedValue::from(vec!["a", "b"]));
    assert!(validate(&mapped, &metadata).is_empty());
}

#[test]
fn retain_headers_drops_vanished_columns() {
    let mut mapping = ColumnMapping::new(short_test_metadata());
    mapping.map_column(fields::ILIAS_NAME, "Login");
    mapping.map_column(fields::TEST_RESULT_STUDENT, "Gone");
    mapping.map_column(fields::EXERCISES, vec!["1", "2", "3"]);

    let changed = mapping.retain_headers(&ilias_headers());

    assert_eq!(
        changed,
        vec![
            fields::EXERCISES.to_string(),
            fields::TEST_RESULT_STUDENT.to_string()
        ]
    );
    let mapped = mapping.mapped_columns();
    assert_eq!(mapped.single(fields::ILIAS_NAME), Some("Login"));
    assert!(!mapped.contains(fields::TEST_RESULT_STUDENT));
    assert_eq!(
        mapped.many(fields::EXERCISES),
        Some(&["1".to_string(), "2".to_string()][..])
    );
}

#[test]
fn available_headers_excludes_static_selections() {
    let mut mapping = ColumnMapping::new(short_test_metadata());
    mapping.map_column(fields::ILIAS_NAME, "Login");
    mapping.map_column(fields::EXERCISES, vec!["1"]);
    let all = ilias_headers();
    let available = mapping.available_headers(&all);
    assert!(!available.contains(&"Login"));
    assert!(available.contains(&"1"));
}

#[test]
fn profile_from_toml() {
    let profile: MappedColumns = toml::from_str(
        r#"
        iliasName = "Login"
        exercises = ["1", "2"]
        "#,
    )
    .expect("parse profile");

    let mut mapping = ColumnMapping::new(short_test_metadata());
    mapping.apply_profile(profile.iter()).expect("apply profile");
    assert!(mapping.validate().is_empty());

    let bogus: MappedColumns = toml::from_str(r#"matrikel = "Nr""#).expect("parse profile");
    assert_eq!(
        mapping.apply_profile(bogus.iter()),
        Err(MappingError::UnknownField("matrikel".to_string()))
    );
}

#[test]
fn metadata_round_trips_through_json() {
    let metadata = short_test_metadata();
    let json = serde_json::to_string(&metadata).expect("serialize");
    let back: tms_map::MappingMetadata = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, metadata);
    assert!(back.get(fields::EXERCISES).is_some_and(|d| d.is_dynamic()));
}
