//! Storage types: uuid arrays and maps, compared by length or by containment

use uuid::Uuid;

use crate::error::EvalError;
use crate::expr::{DataType, RelationalExpression};
use crate::parser::Operator;
use crate::value::Value;

pub(super) fn evaluate(
    expr: &RelationalExpression,
    left: &Value,
    right: Option<&Value>,
) -> Result<bool, EvalError> {
    check_shape(expr, left)?;

    if expr.is_length_expression {
        evaluate_length(expr, left, right)
    } else {
        evaluate_contains(expr, left, right)
    }
}

fn check_shape(expr: &RelationalExpression, left: &Value) -> Result<(), EvalError> {
    let matches = matches!(
        (expr.data_type, left),
        (DataType::UuidArray, Value::UuidArray(_))
            | (DataType::StringMap, Value::StringMap(_))
            | (DataType::BoolMap, Value::BoolMap(_))
            | (DataType::UuidStringMap, Value::UuidStringMap(_))
    );
    if matches {
        Ok(())
    } else {
        Err(EvalError::internal(format!(
            "expected {} operand for {}, found {}",
            expr.data_type,
            expr.path,
            left.kind()
        )))
    }
}

/// `LEN(path) <op> n`: compare the element count with an integer
fn evaluate_length(
    expr: &RelationalExpression,
    left: &Value,
    right: Option<&Value>,
) -> Result<bool, EvalError> {
    if !expr.operator.is_comparison() {
        return Err(EvalError::unsupported(expr.data_type, expr.operator));
    }

    let count = left.element_count().unwrap_or(0) as i64;
    let expected = match right {
        Some(value) => value.as_i64().ok_or_else(|| {
            EvalError::internal(format!(
                "expected integer right operand for LEN({}), found {}",
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
        .compare(&count, &expected)
        .ok_or_else(|| EvalError::unsupported(expr.data_type, expr.operator))
}

/// `path ? key`: key presence for maps, membership for uuid arrays
fn evaluate_contains(
    expr: &RelationalExpression,
    left: &Value,
    right: Option<&Value>,
) -> Result<bool, EvalError> {
    if expr.operator != Operator::Contains {
        return Err(EvalError::unsupported(expr.data_type, expr.operator));
    }

    let needle = match right {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Uuid(u)) => u.to_string(),
        Some(other) => {
            return Err(EvalError::internal(format!(
                "expected string or uuid right operand for {}, found {}",
                expr.path,
                other.kind()
            )))
        }
        None => expr.literal.unquoted().to_string(),
    };

    match left {
        Value::UuidArray(ids) => Ok(ids.contains(&parse_uuid(&needle)?)),
        Value::StringMap(map) => Ok(map.contains_key(&needle)),
        Value::BoolMap(map) => Ok(map.contains_key(&needle)),
        Value::UuidStringMap(map) => Ok(map.contains_key(&parse_uuid(&needle)?)),
        other => Err(EvalError::internal(format!(
            "containment on non-collection {} operand",
            other.kind()
        ))),
    }
}

fn parse_uuid(s: &str) -> Result<Uuid, EvalError> {
    Uuid::parse_str(s).map_err(|e| EvalError::InvalidUuid {
        literal: s.to_string(),
        reason: e.to_string(),
    })
}
