use crate::expr::RelationalExpression;
use crate::parser::{parse_where_filter, ParseError, ParseMode};

pub const DEFAULT_MAX_QUERY_LENGTH: usize = 4096;

/// Compiled LIKE / regex patterns kept by each `Evaluator`
pub const DEFAULT_PATTERN_CACHE_CAPACITY: u64 = 256;

/// Bounds applied to a query before it reaches the parser.
///
/// The grammar caps literal sizes on its own, but the overall query length
/// is the caller's to enforce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryLimits {
    pub max_query_length: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            max_query_length: DEFAULT_MAX_QUERY_LENGTH,
        }
    }
}

impl QueryLimits {
    pub fn check(&self, query: &str) -> Result<(), ParseError> {
        if query.len() > self.max_query_length {
            return Err(ParseError::QueryTooLong {
                length: query.len(),
                max: self.max_query_length,
            });
        }
        Ok(())
    }
}

/// [`parse_where_filter`] preceded by a length check
pub fn parse_where_filter_with_limits(
    query: &str,
    mode: ParseMode,
    limits: &QueryLimits,
) -> Result<Vec<RelationalExpression>, ParseError> {
    limits.check(query)?;
    match mode {
        ParseMode::Standard => parse_where_filter(query, mode),
        ParseMode::Import => crate::parser::parse_import_where_filter(query),
    }
}
