//! Binary expressions and their AND-chaining into a where-filter

use super::error::{span_at, ParseError};
use super::literal::lex_literal;
use super::operator::{Operator, OperatorSet, ParseMode, IMPORT_OPERATORS};
use super::path::lex_attribute;
use super::raw::{lex, skip_whitespace, Rule};
use crate::expr::{DataType, Literal, RelationalExpression};

/// Parse one `path operator operand` clause at the head of `input`.
///
/// `src` is the complete query, used for error locations. Returns the
/// remaining text after the operand.
pub(crate) fn parse_binary_expression<'a>(
    src: &str,
    input: &'a str,
    mode: ParseMode,
) -> Result<(&'a str, RelationalExpression), ParseError> {
    let (attribute, rest) =
        lex_attribute(input).ok_or_else(|| ParseError::invalid_path(src, input))?;
    let rest = skip_whitespace(rest);

    let (operator, rest) = lex_operator(src, rest, mode.operators(), mode)?;
    let rest = skip_whitespace(rest);

    let (literal, data_type, rest) = if operator.is_membership() {
        let (clause, rest) = lex(Rule::in_clause, rest)
            .ok_or_else(|| ParseError::invalid_in_clause(src, rest))?;
        (
            Literal::new(clause.as_str(), DataType::String),
            DataType::String,
            rest,
        )
    } else {
        let operand_start = rest;
        let (literal, rest) =
            lex_literal(rest).ok_or_else(|| ParseError::missing_operand(src, rest))?;
        if literal.data_type() == DataType::Bool && !operator.is_equality() {
            return Err(ParseError::BooleanOrdering {
                operator: operator.to_string(),
                src: src.to_string(),
                span: span_at(src, operand_start),
            });
        }
        let data_type = literal.data_type();
        (literal, data_type, rest)
    };

    Ok((
        rest,
        RelationalExpression {
            path: attribute.path.to_string(),
            operator,
            literal,
            data_type,
            is_length_expression: attribute.is_length,
            split: attribute.split,
        },
    ))
}

fn lex_operator<'a>(
    src: &str,
    input: &'a str,
    allowed: &OperatorSet,
    mode: ParseMode,
) -> Result<(Operator, &'a str), ParseError> {
    let (pair, rest) =
        lex(Rule::operator, input).ok_or_else(|| ParseError::missing_operator(src, input))?;
    let operator: Operator = pair
        .as_str()
        .parse()
        .map_err(|_| ParseError::missing_operator(src, input))?;

    if !allowed.contains(operator) {
        return Err(ParseError::UnsupportedOperator {
            operator: operator.to_string(),
            mode: mode.to_string(),
            supported: allowed.describe(),
            src: src.to_string(),
            span: span_at(src, input),
        });
    }

    Ok((operator, rest))
}

/// Parse a where-filter: relational expressions joined by `AND`.
///
/// An empty (or all-whitespace) query yields no expressions, and parsing
/// stops once the remaining text is empty, so a trailing `AND` is ignored.
pub fn parse_where_filter(
    query: &str,
    mode: ParseMode,
) -> Result<Vec<RelationalExpression>, ParseError> {
    let mut expressions = Vec::new();
    let mut rest = skip_whitespace(query);

    while !rest.is_empty() {
        let (remaining, expression) = parse_binary_expression(query, rest, mode)?;
        expressions.push(expression);

        rest = skip_whitespace(remaining);
        if let Some((_, remaining)) = lex(Rule::and_keyword, rest) {
            rest = skip_whitespace(remaining);
        }
    }

    Ok(expressions)
}

/// Where-filter for resource selection: ordering, pattern and containment operators
pub fn parse_standard_where_filter(query: &str) -> Result<Vec<RelationalExpression>, ParseError> {
    parse_where_filter(query, ParseMode::Standard)
}

/// Where-filter for bulk import: `=`, `!=`, `IN` and `NOT IN` only
pub fn parse_import_where_filter(query: &str) -> Result<Vec<RelationalExpression>, ParseError> {
    let expressions = parse_where_filter(query, ParseMode::Import)?;
    validate_operators(query, &expressions, &IMPORT_OPERATORS, ParseMode::Import)?;
    Ok(expressions)
}

/// Check every expression's operator against an explicit allow-list
pub fn validate_operators(
    query: &str,
    expressions: &[RelationalExpression],
    allowed: &OperatorSet,
    mode: ParseMode,
) -> Result<(), ParseError> {
    match expressions.iter().find(|e| !allowed.contains(e.operator)) {
        Some(expression) => Err(ParseError::UnsupportedOperator {
            operator: expression.operator.to_string(),
            mode: mode.to_string(),
            supported: allowed.describe(),
            src: query.to_string(),
            span: (0, query.len()).into(),
        }),
        None => Ok(()),
    }
}

/// Split the text of an IN clause into its values.
///
/// Parentheses are trimmed and elements are split on commas. Each element is
/// trimmed and loses its leading and trailing single quotes independently,
/// so a quoted value containing a comma splits into bare pieces. Empty
/// elements are dropped.
pub fn split_in_values(clause: &str) -> Vec<String> {
    let clause = clause.trim();
    let inner = clause.strip_prefix('(').unwrap_or(clause);
    let inner = inner.strip_suffix(')').unwrap_or(inner);

    inner
        .split(',')
        .map(|value| value.trim().trim_matches('\''))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_in_values() {
        assert_eq!(
            split_in_values("('Secret', 'ConfigMap')"),
            vec!["Secret", "ConfigMap"]
        );
        assert_eq!(split_in_values("( 'a' ,, 'b', )"), vec!["a", "b"]);
        assert_eq!(split_in_values("(1, 2,3)"), vec!["1", "2", "3"]);
        assert!(split_in_values("()").is_empty());
        assert!(split_in_values("('')").is_empty());
    }

    #[test]
    fn test_split_in_values_unbalanced_quotes() {
        assert_eq!(split_in_values("('a,b', c)"), vec!["a", "b", "c"]);
        assert_eq!(split_in_values("('web, 'api')"), vec!["web", "api"]);
    }

    #[test]
    fn test_binary_expression_remainder() {
        let query = "kind = 'Deployment' AND x = 1";
        let (rest, expr) = parse_binary_expression(query, query, ParseMode::Standard).unwrap();
        assert_eq!(rest, " AND x = 1");
        assert_eq!(expr.path, "kind");
        assert_eq!(expr.operator, Operator::Equals);
        assert_eq!(expr.literal.raw(), "'Deployment'");
        assert_eq!(expr.data_type, DataType::String);
    }

    #[test]
    fn test_no_whitespace_needed() {
        let exprs = parse_where_filter("replicas>=3", ParseMode::Standard).unwrap();
        assert_eq!(exprs[0].operator, Operator::GreaterOrEqual);
        assert_eq!(exprs[0].data_type, DataType::Int);
    }

    #[test]
    fn test_in_clause_is_kept_verbatim() {
        let exprs = parse_where_filter("kind NOT IN ('Secret',  'ConfigMap')", ParseMode::Import)
            .unwrap();
        assert_eq!(exprs[0].operator, Operator::NotIn);
        assert_eq!(exprs[0].data_type, DataType::String);
        assert_eq!(exprs[0].literal.raw(), "('Secret',  'ConfigMap')");
        assert_eq!(exprs[0].in_values(), vec!["Secret", "ConfigMap"]);
    }

    #[test]
    fn test_nested_parentheses_rejected() {
        let err = parse_where_filter("kind IN (('a'))", ParseMode::Import).unwrap_err();
        assert!(matches!(err, ParseError::InvalidInClause { .. }));
    }

    #[test]
    fn test_validate_operators_second_guard() {
        let exprs = parse_standard_where_filter("name LIKE 'a%'").unwrap();
        let err = validate_operators("name LIKE 'a%'", &exprs, &IMPORT_OPERATORS, ParseMode::Import)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "unsupported operator 'LIKE' in import mode; supported operators: =, !=, IN, NOT IN"
        );
    }
}
