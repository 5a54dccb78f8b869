//! String comparison, SQL LIKE and POSIX-style regex operators

use std::sync::Arc;

use crate::error::EvalError;
use crate::expr::{DataType, RelationalExpression};
use crate::parser::Operator;
use crate::value::Value;

use super::pattern::{CompiledPattern, PatternCache, PatternKind};

/// Without a cache, pattern operators compile their pattern on every call
pub(super) fn evaluate(
    expr: &RelationalExpression,
    left: &Value,
    right: Option<&Value>,
    patterns: Option<&PatternCache>,
) -> Result<bool, EvalError> {
    let Value::String(left) = left else {
        return Err(EvalError::internal(format!(
            "expected string operand for {}, found {}",
            expr.path,
            left.kind()
        )));
    };

    let right = match right {
        Some(Value::String(s)) => s.as_str(),
        Some(other) => {
            return Err(EvalError::internal(format!(
                "expected string right operand for {}, found {}",
                expr.path,
                other.kind()
            )))
        }
        None => expr.literal.unquoted(),
    };

    if let Some(result) = expr.operator.compare(left.as_str(), right) {
        return Ok(result);
    }

    let Some(kind) = PatternKind::of(expr.operator) else {
        return Err(EvalError::unsupported(DataType::String, expr.operator));
    };
    let matched = pattern_match(left, right, kind, patterns)?;
    Ok(match expr.operator {
        Operator::NotLike | Operator::NotILike | Operator::NotRegex | Operator::NotIRegex => {
            !matched
        }
        _ => matched,
    })
}

/// Translate a SQL LIKE pattern into an anchored regex.
///
/// `%` matches any run of characters, `_` exactly one; everything else is literal.
pub fn like_to_regex(pattern: &str) -> String {
    let mut translated = String::with_capacity(pattern.len() + 2);
    translated.push('^');
    for c in pattern.chars() {
        match c {
            '%' => translated.push_str(".*"),
            '_' => translated.push('.'),
            c => translated.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    translated.push('$');
    translated
}

fn pattern_match(
    text: &str,
    pattern: &str,
    kind: PatternKind,
    patterns: Option<&PatternCache>,
) -> Result<bool, EvalError> {
    let compiled = match patterns {
        Some(cache) => cache.get_or_compile(pattern, kind)?,
        None => Arc::new(CompiledPattern::compile(pattern, kind)?),
    };
    Ok(compiled.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_translation() {
        assert_eq!(like_to_regex("ab%"), "^ab.*$");
        assert_eq!(like_to_regex("a_c"), "^a.c$");
        assert_eq!(like_to_regex("v1.2%"), r"^v1\.2.*$");
    }

    #[test]
    fn test_like_is_anchored() {
        assert!(pattern_match("abcdef", "ab%", PatternKind::Like, None).unwrap());
        assert!(!pattern_match("xabc", "ab%", PatternKind::Like, None).unwrap());
        assert!(pattern_match("xabc", "%ab%", PatternKind::Like, None).unwrap());
    }

    #[test]
    fn test_like_underscore_is_single_char() {
        assert!(pattern_match("cat", "c_t", PatternKind::Like, None).unwrap());
        assert!(!pattern_match("coat", "c_t", PatternKind::Like, None).unwrap());
    }

    #[test]
    fn test_ilike() {
        assert!(pattern_match("Kube-System", "kube-%", PatternKind::ILike, None).unwrap());
        assert!(!pattern_match("Kube-System", "kube-%", PatternKind::Like, None).unwrap());
    }

    #[test]
    fn test_regex_is_unanchored() {
        assert!(pattern_match("my-nginx-pod", "nginx", PatternKind::Regex, None).unwrap());
        assert!(pattern_match("NGINX", "nginx", PatternKind::IRegex, None).unwrap());
        assert!(!pattern_match("NGINX", "nginx", PatternKind::Regex, None).unwrap());
    }

    #[test]
    fn test_invalid_regex() {
        let err = pattern_match("x", "(", PatternKind::Regex, None).unwrap_err();
        assert!(matches!(err, EvalError::InvalidPattern { .. }));
    }

    #[test]
    fn test_cached_and_uncached_agree() {
        let cache = PatternCache::new(8);
        for (text, pattern, kind) in [
            ("web-1", "web-_", PatternKind::Like),
            ("WEB-1", "web-%", PatternKind::ILike),
            ("my-nginx", "ngin.", PatternKind::Regex),
            ("web-web", r"^(\w+)-\1$", PatternKind::Regex),
        ] {
            assert_eq!(
                pattern_match(text, pattern, kind, Some(&cache)).unwrap(),
                pattern_match(text, pattern, kind, None).unwrap(),
                "{} against {}",
                text,
                pattern
            );
            assert!(cache.contains(pattern, kind));
        }
    }
}
