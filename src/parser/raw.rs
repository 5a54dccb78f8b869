use pest::{iterators::Pair, Parser};
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "parser/grammar.pest"]
pub struct WhereParser;

/// Match a single grammar rule at the head of `input`.
///
/// Returns the matched pair and the unconsumed remainder, or `None` if the
/// rule does not match at position zero.
pub(crate) fn lex(rule: Rule, input: &str) -> Option<(Pair<'_, Rule>, &str)> {
    let pair = WhereParser::parse(rule, input).ok()?.next()?;
    let end = pair.as_span().end();
    Some((pair, &input[end..]))
}

/// Strip leading whitespace, the only separator between tokens.
pub(crate) fn skip_whitespace(input: &str) -> &str {
    input.trim_start()
}
