pub mod error;
pub mod expression;
pub mod literal;
pub mod operator;
pub mod path;
pub mod raw;

// Re-exports for clean API
pub use error::ParseError;
pub use expression::{
    parse_import_where_filter, parse_standard_where_filter, parse_where_filter, split_in_values,
    validate_operators,
};
pub use operator::{Operator, OperatorSet, ParseMode, IMPORT_OPERATORS, STANDARD_OPERATORS};
pub use path::{parse_path, AttributePath, PathSegment};
