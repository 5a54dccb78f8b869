//! Compiled LIKE and regex patterns, cached per evaluator

use std::sync::Arc;

use moka::sync::Cache;
use regex::RegexBuilder;

use crate::error::EvalError;
use crate::hybrid_regex::HybridRegex;
use crate::parser::Operator;

use super::string::like_to_regex;

/// How a pattern literal is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    Like,
    ILike,
    Regex,
    IRegex,
}

impl PatternKind {
    /// The pattern kind behind an operator, ignoring negation
    pub fn of(operator: Operator) -> Option<Self> {
        match operator {
            Operator::Like | Operator::NotLike => Some(PatternKind::Like),
            Operator::ILike | Operator::NotILike => Some(PatternKind::ILike),
            Operator::Regex | Operator::NotRegex => Some(PatternKind::Regex),
            Operator::IRegex | Operator::NotIRegex => Some(PatternKind::IRegex),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum CompiledPattern {
    /// Anchored translation of a LIKE pattern
    Like(regex::Regex),
    Regex(HybridRegex),
}

impl CompiledPattern {
    pub fn compile(pattern: &str, kind: PatternKind) -> Result<Self, EvalError> {
        match kind {
            PatternKind::Like | PatternKind::ILike => RegexBuilder::new(&like_to_regex(pattern))
                .case_insensitive(kind == PatternKind::ILike)
                .dot_matches_new_line(true)
                .build()
                .map(CompiledPattern::Like)
                .map_err(|e| EvalError::InvalidPattern {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                }),
            PatternKind::Regex | PatternKind::IRegex => {
                HybridRegex::with_case(pattern, kind == PatternKind::IRegex)
                    .map(CompiledPattern::Regex)
            }
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        match self {
            CompiledPattern::Like(re) => re.is_match(text),
            CompiledPattern::Regex(re) => re.is_match(text),
        }
    }
}

/// Bounded cache of compiled patterns keyed by pattern text and kind.
///
/// Patterns that fail to compile are not cached.
#[derive(Clone)]
pub struct PatternCache {
    cache: Cache<(String, PatternKind), Arc<CompiledPattern>>,
}

impl PatternCache {
    pub fn new(max_capacity: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(max_capacity.max(1)).build(),
        }
    }

    pub fn get_or_compile(
        &self,
        pattern: &str,
        kind: PatternKind,
    ) -> Result<Arc<CompiledPattern>, EvalError> {
        let key = (pattern.to_string(), kind);
        if let Some(compiled) = self.cache.get(&key) {
            return Ok(compiled);
        }
        let compiled = Arc::new(CompiledPattern::compile(pattern, kind)?);
        self.cache.insert(key, Arc::clone(&compiled));
        Ok(compiled)
    }

    pub fn contains(&self, pattern: &str, kind: PatternKind) -> bool {
        self.cache.contains_key(&(pattern.to_string(), kind))
    }
}

impl std::fmt::Debug for PatternCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternCache")
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_ignores_negation() {
        assert_eq!(PatternKind::of(Operator::NotLike), Some(PatternKind::Like));
        assert_eq!(PatternKind::of(Operator::NotIRegex), Some(PatternKind::IRegex));
        assert_eq!(PatternKind::of(Operator::Equals), None);
    }

    #[test]
    fn test_compiled_once_and_reused() {
        let cache = PatternCache::new(16);
        assert!(!cache.contains("web-%", PatternKind::Like));

        let first = cache.get_or_compile("web-%", PatternKind::Like).unwrap();
        let second = cache.get_or_compile("web-%", PatternKind::Like).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(second.is_match("web-1"));

        // same text, different kind is a separate entry
        assert!(!cache.contains("web-%", PatternKind::ILike));
    }

    #[test]
    fn test_invalid_pattern_not_cached() {
        let cache = PatternCache::new(16);
        let err = cache.get_or_compile("(", PatternKind::Regex).unwrap_err();
        assert!(matches!(err, EvalError::InvalidPattern { .. }));
        assert!(!cache.contains("(", PatternKind::Regex));
    }

    #[test]
    fn test_ilike_is_case_insensitive() {
        let compiled = CompiledPattern::compile("KUBE-%", PatternKind::ILike).unwrap();
        assert!(compiled.is_match("kube-system"));
        let compiled = CompiledPattern::compile("KUBE-%", PatternKind::Like).unwrap();
        assert!(!compiled.is_match("kube-system"));
    }
}
