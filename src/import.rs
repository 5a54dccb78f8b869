//! Projection of an import-mode where-filter into filters and options
//!
//! Expressions on `import.<name>` paths set options for the import pipeline;
//! every other expression becomes an include/exclude filter on an attribute.

use std::collections::BTreeMap;

use crate::expr::{DataType, RelationalExpression};
use crate::parser::{parse_import_where_filter, Operator, ParseError};

pub const IMPORT_OPTION_PREFIX: &str = "import.";

/// One attribute filter for the import pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "PascalCase"))]
pub struct ImportFilter {
    /// The attribute path as written in the query
    #[cfg_attr(feature = "json", serde(rename = "Type"))]
    pub filter_type: String,
    /// `include`, `exclude`, or the query operator when it has no mapping
    pub operator: String,
    pub values: Vec<String>,
}

/// Loosely typed option value
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(untagged))]
pub enum ImportOptionValue {
    Bool(bool),
    /// Integer literal, left unparsed for the consumer
    Number(String),
    String(String),
}

pub type ImportOptions = BTreeMap<String, ImportOptionValue>;

/// Parse an import-mode query and project it into filters and options
pub fn project_to_import_filters(
    query: &str,
) -> Result<(Vec<ImportFilter>, ImportOptions), ParseError> {
    let expressions = parse_import_where_filter(query)?;
    project(&expressions)
}

/// Project already parsed expressions; the input is not modified
pub fn project(
    expressions: &[RelationalExpression],
) -> Result<(Vec<ImportFilter>, ImportOptions), ParseError> {
    let mut filters = Vec::new();
    let mut options = ImportOptions::new();

    for expr in expressions {
        match expr.path.strip_prefix(IMPORT_OPTION_PREFIX) {
            Some(option) => {
                if expr.operator != Operator::Equals {
                    return Err(ParseError::ImportOption {
                        option: option.to_string(),
                        operator: expr.operator.to_string(),
                    });
                }
                // last writer wins
                options.insert(option.to_string(), option_value(expr));
            }
            None => filters.push(filter(expr)),
        }
    }

    Ok((filters, options))
}

fn option_value(expr: &RelationalExpression) -> ImportOptionValue {
    match expr.data_type {
        DataType::Bool => ImportOptionValue::Bool(expr.literal.raw() == "true"),
        DataType::Int => ImportOptionValue::Number(expr.literal.raw().to_string()),
        _ => ImportOptionValue::String(expr.literal.unquoted().to_string()),
    }
}

fn filter(expr: &RelationalExpression) -> ImportFilter {
    let operator = match expr.operator {
        Operator::Equals | Operator::In => "include".to_string(),
        Operator::NotEquals | Operator::NotIn => "exclude".to_string(),
        other => other.to_string(),
    };

    let values = if expr.operator.is_membership() {
        expr.in_values()
    } else {
        vec![expr.literal.unquoted().to_string()]
    };

    ImportFilter {
        filter_type: expr.path.clone(),
        operator,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Literal;

    #[test]
    fn test_operator_mapping() {
        let (filters, options) =
            project_to_import_filters("kind != 'Secret' AND metadata.namespace IN ('a', 'b')")
                .unwrap();
        assert!(options.is_empty());
        assert_eq!(filters[0].operator, "exclude");
        assert_eq!(filters[0].values, vec!["Secret"]);
        assert_eq!(filters[1].operator, "include");
        assert_eq!(filters[1].values, vec!["a", "b"]);
    }

    #[test]
    fn test_unmapped_operator_passes_through() {
        let expr = RelationalExpression {
            path: "metadata.name".to_string(),
            operator: Operator::Like,
            literal: Literal::new("'web-%'", DataType::String),
            data_type: DataType::String,
            is_length_expression: false,
            split: None,
        };
        let (filters, _) = project(&[expr]).unwrap();
        assert_eq!(filters[0].operator, "LIKE");
        assert_eq!(filters[0].values, vec!["web-%"]);
    }

    #[test]
    fn test_option_coercion() {
        let (filters, options) = project_to_import_filters(
            "import.include_system = true AND import.batch_size = 50 AND import.source = 'cluster-a'",
        )
        .unwrap();
        assert!(filters.is_empty());
        assert_eq!(options["include_system"], ImportOptionValue::Bool(true));
        assert_eq!(
            options["batch_size"],
            ImportOptionValue::Number("50".to_string())
        );
        assert_eq!(
            options["source"],
            ImportOptionValue::String("cluster-a".to_string())
        );
    }

    #[test]
    fn test_last_option_wins() {
        let (_, options) =
            project_to_import_filters("import.dry_run = true AND import.dry_run = false").unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options["dry_run"], ImportOptionValue::Bool(false));
    }

    #[test]
    fn test_option_requires_equals() {
        let err = project_to_import_filters("import.dry_run != true").unwrap_err();
        assert_eq!(
            err,
            ParseError::ImportOption {
                option: "dry_run".to_string(),
                operator: "!=".to_string()
            }
        );
    }

    #[test]
    fn test_filters_on_same_path_are_not_merged() {
        let (filters, _) =
            project_to_import_filters("kind = 'Deployment' AND kind = 'Service'").unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0].values, vec!["Deployment"]);
        assert_eq!(filters[1].values, vec!["Service"]);
    }
}
