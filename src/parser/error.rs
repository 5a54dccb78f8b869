use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Errors produced while parsing a where-filter.
///
/// Grammar errors carry the remaining, unparsed text so the failure can be
/// located without a span; the span additionally points into the source query.
#[derive(Debug, Clone, PartialEq, Eq, Diagnostic, Error)]
pub enum ParseError {
    #[error("invalid attribute path at '{remainder}'")]
    #[diagnostic(
        code(wherefilter::invalid_path),
        help("paths are dot-separated keys, e.g. metadata.namespace or spec.template.*.image")
    )]
    InvalidPath {
        remainder: String,
        #[source_code]
        src: String,
        #[label("expected a path here")]
        span: SourceSpan,
    },

    #[error("expected an operator at '{remainder}'")]
    #[diagnostic(code(wherefilter::missing_operator))]
    MissingOperator {
        remainder: String,
        #[source_code]
        src: String,
        #[label("expected an operator")]
        span: SourceSpan,
    },

    #[error("unsupported operator '{operator}' in {mode} mode; supported operators: {supported}")]
    #[diagnostic(code(wherefilter::unsupported_operator))]
    UnsupportedOperator {
        operator: String,
        mode: String,
        supported: String,
        #[source_code]
        src: String,
        #[label("not allowed here")]
        span: SourceSpan,
    },

    #[error("no operand found at '{remainder}'")]
    #[diagnostic(
        code(wherefilter::missing_operand),
        help("operands are integers, true/false, or 'single quoted' strings")
    )]
    MissingOperand {
        remainder: String,
        #[source_code]
        src: String,
        #[label("expected a literal")]
        span: SourceSpan,
    },

    #[error("invalid IN clause at '{remainder}'")]
    #[diagnostic(
        code(wherefilter::invalid_in_clause),
        help("IN takes a parenthesized list such as ('a', 'b'); nested parentheses are not allowed")
    )]
    InvalidInClause {
        remainder: String,
        #[source_code]
        src: String,
        #[label("expected (value, ...)")]
        span: SourceSpan,
    },

    #[error("boolean operand only supports = and !=, found '{operator}'")]
    #[diagnostic(code(wherefilter::boolean_ordering))]
    BooleanOrdering {
        operator: String,
        #[source_code]
        src: String,
        #[label("booleans are not ordered")]
        span: SourceSpan,
    },

    #[error("query is {length} bytes long, maximum is {max}")]
    #[diagnostic(code(wherefilter::query_too_long))]
    QueryTooLong { length: usize, max: usize },

    #[error("import option '{option}' only supports '=', found '{operator}'")]
    #[diagnostic(code(wherefilter::import_option))]
    ImportOption { option: String, operator: String },
}

/// Byte offset of `remainder` within `src`, given that it is a suffix of it.
pub(crate) fn offset_of(src: &str, remainder: &str) -> usize {
    src.len().saturating_sub(remainder.len())
}

/// Span of the first token of `remainder`, at least one byte wide when possible.
pub(crate) fn span_at(src: &str, remainder: &str) -> SourceSpan {
    let start = offset_of(src, remainder);
    let width = remainder
        .find(char::is_whitespace)
        .unwrap_or(remainder.len())
        .max(1)
        .min(src.len().saturating_sub(start));
    if width == 0 && start > 0 {
        // at end of input: point back at the last character
        (start - 1, 1).into()
    } else {
        (start, width).into()
    }
}

impl ParseError {
    pub(crate) fn invalid_path(src: &str, remainder: &str) -> Self {
        ParseError::InvalidPath {
            remainder: remainder.to_string(),
            src: src.to_string(),
            span: span_at(src, remainder),
        }
    }

    pub(crate) fn missing_operator(src: &str, remainder: &str) -> Self {
        ParseError::MissingOperator {
            remainder: remainder.to_string(),
            src: src.to_string(),
            span: span_at(src, remainder),
        }
    }

    pub(crate) fn missing_operand(src: &str, remainder: &str) -> Self {
        ParseError::MissingOperand {
            remainder: remainder.to_string(),
            src: src.to_string(),
            span: span_at(src, remainder),
        }
    }

    pub(crate) fn invalid_in_clause(src: &str, remainder: &str) -> Self {
        ParseError::InvalidInClause {
            remainder: remainder.to_string(),
            src: src.to_string(),
            span: span_at(src, remainder),
        }
    }

    /// The unparsed text at the failure point, for grammar errors
    pub fn remainder(&self) -> Option<&str> {
        match self {
            ParseError::InvalidPath { remainder, .. }
            | ParseError::MissingOperator { remainder, .. }
            | ParseError::MissingOperand { remainder, .. }
            | ParseError::InvalidInClause { remainder, .. } => Some(remainder),
            _ => None,
        }
    }
}
