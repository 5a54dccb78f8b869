//! Declared attribute types
//!
//! The lexer only infers `int`, `bool` and `string` from literals. Callers
//! that know an attribute is a uuid, a timestamp or a storage type declare it
//! here, and [`AttributeTypes::apply`] re-types the parsed expressions.

use std::collections::HashMap;

use miette::Diagnostic;
use thiserror::Error;

use crate::expr::{DataType, RelationalExpression};
use crate::parser::Operator;

#[derive(Debug, Clone, PartialEq, Eq, Diagnostic, Error)]
pub enum SchemaError {
    #[error("LEN() requires a collection attribute, but {path} is {data_type}")]
    #[diagnostic(code(wherefilter::schema::length))]
    LengthOfScalar { path: String, data_type: DataType },

    #[error("{path} is {data_type}; only LEN() comparisons and '?' are supported, found '{operator}'")]
    #[diagnostic(code(wherefilter::schema::collection_operator))]
    CollectionOperator {
        path: String,
        data_type: DataType,
        operator: Operator,
    },

    #[error("{path} is {declared}, but is compared with a {found} literal")]
    #[diagnostic(code(wherefilter::schema::literal_type))]
    LiteralType {
        path: String,
        declared: DataType,
        found: DataType,
    },
}

/// Map from attribute path to declared type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeTypes {
    types: HashMap<String, DataType>,
}

impl AttributeTypes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, data_type: DataType) -> Self {
        self.insert(path, data_type);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, data_type: DataType) {
        self.types.insert(path.into(), data_type);
    }

    pub fn get(&self, path: &str) -> Option<DataType> {
        self.types.get(path).copied()
    }

    /// Re-type expressions on declared paths, checking operator and literal compatibility
    pub fn apply(
        &self,
        expressions: &[RelationalExpression],
    ) -> Result<Vec<RelationalExpression>, SchemaError> {
        expressions.iter().map(|e| self.apply_one(e)).collect()
    }

    fn apply_one(&self, expr: &RelationalExpression) -> Result<RelationalExpression, SchemaError> {
        // IN clauses are typed as strings regardless of the attribute
        if expr.operator.is_membership() {
            return Ok(expr.clone());
        }

        let Some(declared) = self.get(&expr.path) else {
            if expr.is_length_expression {
                return Err(SchemaError::LengthOfScalar {
                    path: expr.path.clone(),
                    data_type: expr.data_type,
                });
            }
            return Ok(expr.clone());
        };

        if expr.is_length_expression && !declared.is_collection() {
            return Err(SchemaError::LengthOfScalar {
                path: expr.path.clone(),
                data_type: declared,
            });
        }

        if declared.is_collection()
            && !expr.is_length_expression
            && expr.operator != Operator::Contains
        {
            return Err(SchemaError::CollectionOperator {
                path: expr.path.clone(),
                data_type: declared,
                operator: expr.operator,
            });
        }

        if matches!(declared, DataType::Int | DataType::Bool)
            && expr.literal.data_type() != declared
        {
            return Err(SchemaError::LiteralType {
                path: expr.path.clone(),
                declared,
                found: expr.literal.data_type(),
            });
        }

        Ok(expr.with_data_type(declared))
    }
}

impl<S: Into<String>> FromIterator<(S, DataType)> for AttributeTypes {
    fn from_iter<T: IntoIterator<Item = (S, DataType)>>(iter: T) -> Self {
        Self {
            types: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_standard_where_filter;

    #[test]
    fn test_retypes_declared_paths() {
        let exprs = parse_standard_where_filter(
            "metadata.uid = '67e55044-10b1-426f-9247-bb680e5fe0c8' AND kind = 'Pod'",
        )
        .unwrap();
        let types = AttributeTypes::new().with("metadata.uid", DataType::Uuid);
        let typed = types.apply(&exprs).unwrap();
        assert_eq!(typed[0].data_type, DataType::Uuid);
        assert_eq!(typed[1].data_type, DataType::String);
        // the parsed list is untouched
        assert_eq!(exprs[0].data_type, DataType::String);
    }

    #[test]
    fn test_length_needs_collection() {
        let exprs = parse_standard_where_filter("LEN(metadata.name) > 1").unwrap();
        let types = AttributeTypes::new().with("metadata.name", DataType::String);
        assert!(matches!(
            types.apply(&exprs),
            Err(SchemaError::LengthOfScalar { .. })
        ));
        assert!(matches!(
            AttributeTypes::new().apply(&exprs),
            Err(SchemaError::LengthOfScalar { .. })
        ));
    }

    #[test]
    fn test_collection_needs_contains() {
        let exprs = parse_standard_where_filter("metadata.labels = 'app'").unwrap();
        let types: AttributeTypes = [("metadata.labels", DataType::StringMap)]
            .into_iter()
            .collect();
        assert!(matches!(
            types.apply(&exprs),
            Err(SchemaError::CollectionOperator { .. })
        ));
    }

    #[test]
    fn test_literal_type_mismatch() {
        let exprs = parse_standard_where_filter("spec.replicas = 'three'").unwrap();
        let types = AttributeTypes::new().with("spec.replicas", DataType::Int);
        assert_eq!(
            types.apply(&exprs),
            Err(SchemaError::LiteralType {
                path: "spec.replicas".to_string(),
                declared: DataType::Int,
                found: DataType::String
            })
        );
    }
}
