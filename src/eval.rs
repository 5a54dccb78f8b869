use chrono::{DateTime, Utc};
use slog::{debug, o, Logger};
use uuid::Uuid;

use crate::config::DEFAULT_PATTERN_CACHE_CAPACITY;
use crate::error::EvalError;
use crate::expr::{DataType, RelationalExpression};
use crate::parser::Operator;
use crate::value::Value;

pub mod collection;
pub mod pattern;
pub mod string;

use pattern::PatternCache;

/// Pluggable override for string-typed evaluation of specific paths.
///
/// Comparators are consulted in order and the first one whose
/// [`matches_path`](CustomComparator::matches_path) returns true decides the
/// result. The right-hand side is always the expression's literal.
pub trait CustomComparator {
    fn matches_path(&self, path: &str) -> bool;
    fn evaluate(&self, expr: &RelationalExpression, value: &Value) -> Result<bool, EvalError>;
}

/// Evaluates parsed expressions against caller-resolved operands.
///
/// LIKE and regex patterns are compiled once per evaluator and reused across
/// evaluations.
pub struct Evaluator {
    logger: Logger,
    comparators: Vec<Box<dyn CustomComparator + Send + Sync>>,
    patterns: PatternCache,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(&Logger::root(slog::Discard, o!()))
    }
}

impl Evaluator {
    pub fn new(logger: &Logger) -> Self {
        Self {
            logger: logger.new(o!("component" => "evaluator")),
            comparators: Vec::new(),
            patterns: PatternCache::new(DEFAULT_PATTERN_CACHE_CAPACITY),
        }
    }

    /// Replace the pattern cache with one holding at most `capacity` patterns
    pub fn with_pattern_cache_capacity(mut self, capacity: u64) -> Self {
        self.patterns = PatternCache::new(capacity);
        self
    }

    pub fn patterns(&self) -> &PatternCache {
        &self.patterns
    }

    /// Register a comparator after those already registered
    pub fn with_comparator(
        mut self,
        comparator: impl CustomComparator + Send + Sync + 'static,
    ) -> Self {
        self.comparators.push(Box::new(comparator));
        self
    }

    /// Evaluate one expression.
    ///
    /// `right` is `None` when comparing against the literal, and must be
    /// `None` for IN / NOT IN.
    pub fn evaluate(
        &self,
        expr: &RelationalExpression,
        left: &Value,
        right: Option<&Value>,
    ) -> Result<bool, EvalError> {
        let comparator = self
            .comparators
            .iter()
            .find(|c| c.matches_path(&expr.path))
            .map(|c| c.as_ref() as &dyn CustomComparator);
        evaluate_with(
            &self.logger,
            expr,
            left,
            right,
            comparator,
            Some(&self.patterns),
        )
    }

    /// AND of all expressions, with operands supplied by `resolve`.
    ///
    /// An expression whose attribute does not resolve does not match.
    pub fn matches_all<F>(
        &self,
        expressions: &[RelationalExpression],
        mut resolve: F,
    ) -> Result<bool, EvalError>
    where
        F: FnMut(&RelationalExpression) -> Option<Value>,
    {
        for expr in expressions {
            let Some(left) = resolve(expr) else {
                debug!(self.logger, "attribute not found"; "path" => &expr.path);
                return Ok(false);
            };
            if !self.evaluate(expr, &left, None)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Evaluate one expression with an explicit comparator list and no logging.
///
/// Patterns are compiled on every call; use an [`Evaluator`] to reuse them.
pub fn evaluate(
    expr: &RelationalExpression,
    left: &Value,
    right: Option<&Value>,
    comparators: &[&dyn CustomComparator],
) -> Result<bool, EvalError> {
    let logger = Logger::root(slog::Discard, o!());
    let comparator = comparators
        .iter()
        .copied()
        .find(|c| c.matches_path(&expr.path));
    evaluate_with(&logger, expr, left, right, comparator, None)
}

fn evaluate_with(
    logger: &Logger,
    expr: &RelationalExpression,
    left: &Value,
    right: Option<&Value>,
    comparator: Option<&dyn CustomComparator>,
    patterns: Option<&PatternCache>,
) -> Result<bool, EvalError> {
    let logger = logger.new(o!("path" => expr.path.clone()));
    debug!(logger, "evaluate"; "expr" => %expr, "data_type" => %expr.data_type, "left" => %left);

    let result = if expr.operator.is_membership() {
        evaluate_membership(expr, left, right)
    } else {
        match expr.data_type {
            DataType::String => match comparator {
                Some(comparator) => {
                    debug!(logger, "delegating to custom comparator");
                    comparator.evaluate(expr, left)
                }
                None => string::evaluate(expr, left, right, patterns),
            },
            DataType::Int => evaluate_int(expr, left, right),
            DataType::Bool => evaluate_bool(expr, left, right),
            DataType::Uuid => evaluate_uuid(expr, left, right),
            DataType::Time => evaluate_time(expr, left, right),
            DataType::UuidArray
            | DataType::StringMap
            | DataType::BoolMap
            | DataType::UuidStringMap => collection::evaluate(expr, left, right),
            DataType::Enum => Err(EvalError::unsupported(expr.data_type, expr.operator)),
        }
    };

    match &result {
        Ok(matched) => debug!(logger, "evaluated"; "result" => matched),
        Err(e) => debug!(logger, "evaluation failed"; "error" => %e),
    }
    result
}

/// IN / NOT IN: stringify the left operand and look it up in the clause values
fn evaluate_membership(
    expr: &RelationalExpression,
    left: &Value,
    right: Option<&Value>,
) -> Result<bool, EvalError> {
    if right.is_some() {
        return Err(EvalError::internal(format!(
            "{} takes no right operand",
            expr.operator
        )));
    }

    let needle = match left {
        Value::String(s) => s.clone(),
        Value::Int(i) => i.to_string(),
        Value::Int64(i) => i.to_string(),
        Value::Float(f) => (f.trunc() as i64).to_string(),
        Value::Bool(b) => b.to_string(),
        other => {
            return Err(EvalError::internal(format!(
                "unsupported {} operand for {}",
                other.kind(),
                expr.operator
            )))
        }
    };

    let found = expr.in_values().iter().any(|v| *v == needle);
    Ok(match expr.operator {
        Operator::NotIn => !found,
        _ => found,
    })
}

fn evaluate_int(
    expr: &RelationalExpression,
    left: &Value,
    right: Option<&Value>,
) -> Result<bool, EvalError> {
    let left = left.as_i64().ok_or_else(|| {
        EvalError::internal(format!(
            "expected integer operand for {}, found {}",
            expr.path,
            left.kind()
        ))
    })?;
    let right = match right {
        Some(value) => value.as_i64().ok_or_else(|| {
            EvalError::internal(format!(
                "expected integer right operand for {}, found {}",
                expr.path,
                value.kind()
            ))
        })?,
        None => expr
            .literal
            .unquoted()
            .parse::<i64>()
            .map_err(|_| EvalError::InvalidLiteral {
                data_type: DataType::Int,
                literal: expr.literal.raw().to_string(),
            })?,
    };

    expr.operator
        .compare(&left, &right)
        .ok_or_else(|| EvalError::unsupported(DataType::Int, expr.operator))
}

fn evaluate_bool(
    expr: &RelationalExpression,
    left: &Value,
    right: Option<&Value>,
) -> Result<bool, EvalError> {
    if !expr.operator.is_equality() {
        return Err(EvalError::unsupported(DataType::Bool, expr.operator));
    }
    let Value::Bool(left) = left else {
        return Err(EvalError::internal(format!(
            "expected bool operand for {}, found {}",
            expr.path,
            left.kind()
        )));
    };
    let right = match right {
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            return Err(EvalError::internal(format!(
                "expected bool right operand for {}, found {}",
                expr.path,
                other.kind()
            )))
        }
        None => expr
            .literal
            .unquoted()
            .parse::<bool>()
            .map_err(|_| EvalError::InvalidLiteral {
                data_type: DataType::Bool,
                literal: expr.literal.raw().to_string(),
            })?,
    };

    Ok(expr.operator.compare(left, &right).unwrap_or(false))
}

fn evaluate_uuid(
    expr: &RelationalExpression,
    left: &Value,
    right: Option<&Value>,
) -> Result<bool, EvalError> {
    if !expr.operator.is_equality() {
        return Err(EvalError::unsupported(DataType::Uuid, expr.operator));
    }
    let Value::Uuid(left) = left else {
        return Err(EvalError::internal(format!(
            "expected uuid operand for {}, found {}",
            expr.path,
            left.kind()
        )));
    };
    let right = match right {
        Some(Value::Uuid(u)) => *u,
        Some(Value::String(s)) => parse_uuid(s)?,
        Some(other) => {
            return Err(EvalError::internal(format!(
                "expected uuid right operand for {}, found {}",
                expr.path,
                other.kind()
            )))
        }
        None => parse_uuid(expr.literal.unquoted())?,
    };

    Ok(expr.operator.compare(left, &right).unwrap_or(false))
}

fn parse_uuid(s: &str) -> Result<Uuid, EvalError> {
    Uuid::parse_str(s).map_err(|e| EvalError::InvalidUuid {
        literal: s.to_string(),
        reason: e.to_string(),
    })
}

fn evaluate_time(
    expr: &RelationalExpression,
    left: &Value,
    right: Option<&Value>,
) -> Result<bool, EvalError> {
    let Value::Time(left) = left else {
        return Err(EvalError::internal(format!(
            "expected time operand for {}, found {}",
            expr.path,
            left.kind()
        )));
    };
    let right = match right {
        Some(Value::Time(t)) => *t,
        Some(Value::String(s)) => parse_time(s)?,
        Some(other) => {
            return Err(EvalError::internal(format!(
                "expected time right operand for {}, found {}",
                expr.path,
                other.kind()
            )))
        }
        None => parse_time(expr.literal.unquoted())?,
    };

    expr.operator
        .compare(left, &right)
        .ok_or_else(|| EvalError::unsupported(DataType::Time, expr.operator))
}

/// Parse an RFC 3339 timestamp, normalized to UTC
pub fn parse_time(s: &str) -> Result<DateTime<Utc>, EvalError> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| EvalError::InvalidTime {
            literal: s.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Literal;

    fn expr(data_type: DataType, operator: Operator, literal: &str) -> RelationalExpression {
        RelationalExpression {
            path: "attr".to_string(),
            operator,
            literal: Literal::new(literal, data_type),
            data_type,
            is_length_expression: false,
            split: None,
        }
    }

    #[test]
    fn test_int_right_operand_representations() {
        let e = expr(DataType::Int, Operator::Greater, "3");
        assert!(evaluate(&e, &Value::Int(4), None, &[]).unwrap());
        assert!(!evaluate(&e, &Value::Int64(3), None, &[]).unwrap());
        assert!(evaluate(&e, &Value::Int(4), Some(&Value::Float(3.7)), &[]).unwrap());
        assert!(evaluate(&e, &Value::Int(4), Some(&Value::Int64(1)), &[]).unwrap());
    }

    #[test]
    fn test_int_operand_mismatch_is_internal() {
        let e = expr(DataType::Int, Operator::Equals, "3");
        let err = evaluate(&e, &Value::from("3"), None, &[]).unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn test_bool_equality_only() {
        let e = expr(DataType::Bool, Operator::NotEquals, "true");
        assert!(evaluate(&e, &Value::Bool(false), None, &[]).unwrap());

        let e = expr(DataType::Bool, Operator::Less, "true");
        assert!(matches!(
            evaluate(&e, &Value::Bool(false), None, &[]),
            Err(EvalError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_uuid_strips_quotes() {
        let id = "67e55044-10b1-426f-9247-bb680e5fe0c8";
        let e = expr(DataType::Uuid, Operator::Equals, &format!("'{}'", id));
        let left = Value::Uuid(Uuid::parse_str(id).unwrap());
        assert!(evaluate(&e, &left, None, &[]).unwrap());
    }

    #[test]
    fn test_uuid_invalid_literal() {
        let e = expr(DataType::Uuid, Operator::Equals, "'nope'");
        let err = evaluate(&e, &Value::Uuid(Uuid::nil()), None, &[]).unwrap_err();
        assert!(matches!(err, EvalError::InvalidUuid { .. }));
        assert!(!err.is_internal());
    }

    #[test]
    fn test_time_value_equality() {
        let e = expr(DataType::Time, Operator::Equals, "'2024-05-01T14:00:00+02:00'");
        let left = Value::Time(parse_time("2024-05-01T12:00:00Z").unwrap());
        assert!(evaluate(&e, &left, None, &[]).unwrap());

        let e = expr(DataType::Time, Operator::Less, "'2024-05-01T12:00:01Z'");
        assert!(evaluate(&e, &left, None, &[]).unwrap());
    }

    #[test]
    fn test_time_invalid_literal() {
        let e = expr(DataType::Time, Operator::Less, "'yesterday'");
        let left = Value::Time(Utc::now());
        assert!(matches!(
            evaluate(&e, &left, None, &[]),
            Err(EvalError::InvalidTime { .. })
        ));
    }

    #[test]
    fn test_enum_is_unsupported() {
        let e = expr(DataType::Enum, Operator::Equals, "'Ready'");
        assert!(matches!(
            evaluate(&e, &Value::from("Ready"), None, &[]),
            Err(EvalError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_membership_rejects_right_operand() {
        let e = expr(DataType::String, Operator::In, "('a')");
        let err = evaluate(&e, &Value::from("a"), Some(&Value::from("a")), &[]).unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn test_membership_stringifies_left() {
        let e = expr(DataType::String, Operator::In, "(1, 2, 3)");
        assert!(evaluate(&e, &Value::Int(2), None, &[]).unwrap());
        assert!(evaluate(&e, &Value::Float(3.9), None, &[]).unwrap());

        let e = expr(DataType::String, Operator::NotIn, "('true')");
        assert!(!evaluate(&e, &Value::Bool(true), None, &[]).unwrap());
        assert!(evaluate(&e, &Value::Bool(false), None, &[]).unwrap());
    }
}
