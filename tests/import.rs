use wherefilter::import::project;
use wherefilter::{
    parse_import_where_filter, project_to_import_filters, ImportFilter, ImportOptionValue,
    ParseError,
};

fn filter(filter_type: &str, operator: &str, values: &[&str]) -> ImportFilter {
    ImportFilter {
        filter_type: filter_type.to_string(),
        operator: operator.to_string(),
        values: values.iter().map(|v| v.to_string()).collect(),
    }
}

#[test]
fn test_single_include() {
    let (filters, options) = project_to_import_filters("metadata.namespace = 'default'").unwrap();
    assert_eq!(filters, vec![filter("metadata.namespace", "include", &["default"])]);
    assert!(options.is_empty());
}

#[test]
fn test_not_in_excludes_every_value() {
    let (filters, _) = project_to_import_filters("kind NOT IN ('Secret', 'ConfigMap')").unwrap();
    assert_eq!(filters, vec![filter("kind", "exclude", &["Secret", "ConfigMap"])]);
}

#[test]
fn test_filters_and_options_are_disjoint() {
    let (filters, options) = project_to_import_filters(
        "metadata.namespace = 'default' AND import.include_system = true",
    )
    .unwrap();
    assert_eq!(filters, vec![filter("metadata.namespace", "include", &["default"])]);
    assert_eq!(options.len(), 1);
    assert_eq!(options["include_system"], ImportOptionValue::Bool(true));
}

#[test]
fn test_filters_keep_query_order() {
    let (filters, _) = project_to_import_filters(
        "metadata.name IN ('a', '', 'b') AND import.dry_run = false AND kind != 'Secret'",
    )
    .unwrap();
    assert_eq!(
        filters,
        vec![
            filter("metadata.name", "include", &["a", "b"]),
            filter("kind", "exclude", &["Secret"]),
        ]
    );
}

#[test]
fn test_projection_does_not_modify_expressions() {
    let exprs = parse_import_where_filter("kind = 'Pod' AND import.batch_size = 10").unwrap();
    let before = exprs.clone();
    let first = project(&exprs).unwrap();
    let second = project(&exprs).unwrap();
    assert_eq!(exprs, before);
    assert_eq!(first, second);
}

#[test]
fn test_option_with_in_is_rejected() {
    let err = project_to_import_filters("import.source IN ('a', 'b')").unwrap_err();
    assert!(matches!(err, ParseError::ImportOption { ref operator, .. } if operator == "IN"));
}

#[test]
fn test_standard_operator_never_reaches_projection() {
    assert!(matches!(
        project_to_import_filters("metadata.name LIKE 'web-%'"),
        Err(ParseError::UnsupportedOperator { .. })
    ));
}

#[cfg(feature = "json")]
#[test]
fn test_json_field_names() {
    let (filters, options) = project_to_import_filters(
        "kind IN ('Deployment') AND import.batch_size = 25 AND import.source = 'prod'",
    )
    .unwrap();

    let filters = serde_json::to_value(&filters).unwrap();
    assert_eq!(
        filters,
        serde_json::json!([{ "Type": "kind", "Operator": "include", "Values": ["Deployment"] }])
    );

    let options = serde_json::to_value(&options).unwrap();
    assert_eq!(
        options,
        serde_json::json!({ "batch_size": "25", "source": "prod" })
    );
}

#[test]
fn test_quotes_stripped_from_each_in_value() {
    let (filters, _) = project_to_import_filters("metadata.name IN ('web,api', 'db')").unwrap();
    assert_eq!(
        filters,
        vec![filter("metadata.name", "include", &["web", "api", "db"])]
    );
}
