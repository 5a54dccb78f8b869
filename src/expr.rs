//! Parsed where-filter expressions and the data types they are evaluated as

use std::fmt;
use std::str::FromStr;

use crate::parser::operator::Operator;

/// Declared type of an attribute, which selects the evaluation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    String,
    Int,
    Bool,
    Enum,
    Uuid,
    Time,
    /// `[]uuid`
    UuidArray,
    /// `map[string]string`
    StringMap,
    /// `map[string]bool`
    BoolMap,
    /// unordered map from uuid keys to strings
    UuidStringMap,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Int => "int",
            DataType::Bool => "bool",
            DataType::Enum => "enum",
            DataType::Uuid => "uuid",
            DataType::Time => "time",
            DataType::UuidArray => "[]uuid",
            DataType::StringMap => "map[string]string",
            DataType::BoolMap => "map[string]bool",
            DataType::UuidStringMap => "map[uuid]string",
        }
    }

    /// Storage types: evaluated either by length or by containment
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            DataType::UuidArray | DataType::StringMap | DataType::BoolMap | DataType::UuidStringMap
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let data_type = match s {
            "string" => DataType::String,
            "int" => DataType::Int,
            "bool" => DataType::Bool,
            "enum" => DataType::Enum,
            "uuid" => DataType::Uuid,
            "time" => DataType::Time,
            "[]uuid" => DataType::UuidArray,
            "map[string]string" => DataType::StringMap,
            "map[string]bool" => DataType::BoolMap,
            "map[uuid]string" => DataType::UuidStringMap,
            _ => return Err(format!("unknown data type: {}", s)),
        };
        Ok(data_type)
    }
}

/// A literal operand as written in the query, with its inferred type.
///
/// String literals keep their surrounding quotes; use [`Literal::unquoted`]
/// for the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    raw: String,
    data_type: DataType,
}

impl Literal {
    pub fn new(raw: impl Into<String>, data_type: DataType) -> Self {
        Self {
            raw: raw.into(),
            data_type,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Literal text with whitespace trimmed and one pair of single quotes removed
    pub fn unquoted(&self) -> &str {
        unquote(&self.raw)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Trim whitespace and strip a surrounding pair of single quotes, if present
pub(crate) fn unquote(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix('\'')
        .and_then(|inner| inner.strip_suffix('\''))
        .unwrap_or(s)
}

/// The two halves of a path written with the split marker, `a.b.|c.d`.
///
/// `visitor_path` must exist in the document; `sub_path` may not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPath {
    pub visitor_path: String,
    pub sub_path: String,
}

/// One `path operator literal` clause of a where-filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationalExpression {
    /// Attribute path as written, without any `LEN(...)` wrapper
    pub path: String,
    pub operator: Operator,
    /// For IN / NOT IN, the whole parenthesized clause
    pub literal: Literal,
    pub data_type: DataType,
    pub is_length_expression: bool,
    pub split: Option<SplitPath>,
}

impl RelationalExpression {
    pub fn is_split_path(&self) -> bool {
        self.split.is_some()
    }

    pub fn visitor_path(&self) -> Option<&str> {
        self.split.as_ref().map(|s| s.visitor_path.as_str())
    }

    pub fn sub_path(&self) -> Option<&str> {
        self.split.as_ref().map(|s| s.sub_path.as_str())
    }

    /// Values of an IN / NOT IN clause; empty for other operators
    pub fn in_values(&self) -> Vec<String> {
        if self.operator.is_membership() {
            crate::parser::split_in_values(self.literal.raw())
        } else {
            Vec::new()
        }
    }

    /// Copy of this expression evaluated as `data_type` instead of the inferred type
    pub fn with_data_type(&self, data_type: DataType) -> Self {
        Self {
            data_type,
            ..self.clone()
        }
    }
}

impl fmt::Display for RelationalExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_length_expression {
            write!(f, "LEN({})", self.path)?;
        } else {
            f.write_str(&self.path)?;
        }
        write!(f, " {} {}", self.operator, self.literal)
    }
}
