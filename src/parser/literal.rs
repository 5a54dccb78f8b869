//! Literal operands: integers, booleans and single-quoted strings

use super::raw::{lex, Rule};
use crate::expr::{DataType, Literal};

/// Recognize a literal at the head of `input`.
///
/// Integer, boolean and string forms are tried in that order. Returns the
/// literal and the remaining text, or `None` when no form matches.
pub(crate) fn lex_literal(input: &str) -> Option<(Literal, &str)> {
    const FORMS: [(Rule, DataType); 3] = [
        (Rule::int_literal, DataType::Int),
        (Rule::bool_literal, DataType::Bool),
        (Rule::string_literal, DataType::String),
    ];

    FORMS.iter().find_map(|(rule, data_type)| {
        lex(*rule, input).map(|(pair, rest)| (Literal::new(pair.as_str(), *data_type), rest))
    })
}
