use miette::Diagnostic;
use thiserror::Error;

use crate::expr::DataType;
use crate::parser::{Operator, ParseError};
use crate::schema::SchemaError;

/// Errors produced while evaluating a parsed expression.
///
/// [`EvalError::Internal`] marks a broken contract with the caller, such as
/// an operand whose type disagrees with the declared data type. Every other
/// variant is an ordinary failure caused by the query itself.
#[derive(Debug, Clone, PartialEq, Eq, Diagnostic, Error)]
pub enum EvalError {
    #[error("internal error: {0}")]
    #[diagnostic(code(wherefilter::internal))]
    Internal(String),

    #[error("unsupported data type {data_type} with operator {operator}")]
    #[diagnostic(code(wherefilter::unsupported))]
    Unsupported {
        data_type: DataType,
        operator: Operator,
    },

    #[error("invalid uuid literal '{literal}': {reason}")]
    #[diagnostic(code(wherefilter::invalid_uuid))]
    InvalidUuid { literal: String, reason: String },

    #[error("invalid time literal '{literal}': {reason}")]
    #[diagnostic(
        code(wherefilter::invalid_time),
        help("timestamps use RFC 3339, e.g. '2024-05-01T12:00:00Z'")
    )]
    InvalidTime { literal: String, reason: String },

    #[error("invalid {data_type} literal '{literal}'")]
    #[diagnostic(code(wherefilter::invalid_literal))]
    InvalidLiteral { data_type: DataType, literal: String },

    #[error("invalid pattern '{pattern}': {reason}")]
    #[diagnostic(code(wherefilter::invalid_pattern))]
    InvalidPattern { pattern: String, reason: String },

    #[error("custom comparator failed: {0}")]
    #[diagnostic(code(wherefilter::comparator))]
    Comparator(String),
}

impl EvalError {
    pub(crate) fn internal(msg: impl Into<String>) -> Self {
        EvalError::Internal(msg.into())
    }

    pub(crate) fn unsupported(data_type: DataType, operator: Operator) -> Self {
        EvalError::Unsupported {
            data_type,
            operator,
        }
    }

    /// True when the error indicates a caller bug rather than a bad query
    pub fn is_internal(&self) -> bool {
        matches!(self, EvalError::Internal(_))
    }
}

/// Any error this crate produces
#[derive(Debug, Clone, PartialEq, Eq, Diagnostic, Error)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] SchemaError),
}
