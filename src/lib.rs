//! Where-filter query language for selecting configuration resources.
//!
//! A where-filter is a chain of `path operator literal` clauses joined by
//! `AND`, e.g. `metadata.namespace = 'default' AND kind != 'Secret'`. Queries
//! are parsed eagerly into [`RelationalExpression`]s, which are then either
//! evaluated against attribute values resolved by the caller, or projected
//! into filters and options for a bulk import.

pub mod config;
pub mod error;
pub mod eval;
pub mod expr;
pub mod hybrid_regex;
pub mod import;
pub mod parser;
pub mod schema;
pub mod value;

pub use config::QueryLimits;
pub use error::{Error, EvalError};
pub use eval::{evaluate, CustomComparator, Evaluator};
pub use expr::{DataType, Literal, RelationalExpression, SplitPath};
pub use import::{project_to_import_filters, ImportFilter, ImportOptionValue, ImportOptions};
pub use parser::{
    parse_import_where_filter, parse_standard_where_filter, parse_where_filter, Operator,
    ParseError, ParseMode,
};
pub use schema::AttributeTypes;
pub use value::Value;
