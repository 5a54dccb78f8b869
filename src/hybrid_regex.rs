use std::fmt;

use crate::error::EvalError;

/// Compiled pattern for the `~` family of operators.
///
/// The `regex` crate handles most patterns. Those it rejects, typically
/// backreferences and lookaround, are compiled with PCRE2 instead.
#[derive(Clone)]
pub enum HybridRegex {
    Rust(regex::Regex),
    Pcre2(pcre2::bytes::Regex),
}

impl HybridRegex {
    pub fn new(pattern: &str) -> Result<Self, EvalError> {
        Self::with_case(pattern, false)
    }

    /// Compile `pattern`, ignoring case for `~*` and `!~*`
    pub fn with_case(pattern: &str, case_insensitive: bool) -> Result<Self, EvalError> {
        let rust_err = match regex::RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .build()
        {
            Ok(re) => return Ok(HybridRegex::Rust(re)),
            Err(e) => e,
        };

        pcre2::bytes::RegexBuilder::new()
            .caseless(case_insensitive)
            .utf(true)
            .build(pattern)
            .map(HybridRegex::Pcre2)
            .map_err(|pcre_err| EvalError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: format!("{}; PCRE2: {}", rust_err, pcre_err),
            })
    }

    /// Unanchored search
    pub fn is_match(&self, text: &str) -> bool {
        match self {
            HybridRegex::Rust(re) => re.is_match(text),
            // a PCRE2 match error (e.g. backtrack limit) counts as no match
            HybridRegex::Pcre2(re) => re.is_match(text.as_bytes()).unwrap_or(false),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HybridRegex::Rust(re) => re.as_str(),
            HybridRegex::Pcre2(re) => re.as_str(),
        }
    }

    pub fn engine(&self) -> &'static str {
        match self {
            HybridRegex::Rust(_) => "regex",
            HybridRegex::Pcre2(_) => "pcre2",
        }
    }
}

impl fmt::Debug for HybridRegex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.engine(), self.as_str())
    }
}

impl fmt::Display for HybridRegex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_engine_preferred() {
        let re = HybridRegex::new("^nginx:[0-9.]+$").unwrap();
        assert_eq!(re.engine(), "regex");
        assert!(re.is_match("nginx:1.25"));
        assert!(!re.is_match("nginx:latest"));
    }

    #[test]
    fn test_backreference_falls_back_to_pcre2() {
        let re = HybridRegex::new(r"^(\w+)-\1$").unwrap();
        assert_eq!(re.engine(), "pcre2");
        assert!(re.is_match("web-web"));
        assert!(!re.is_match("web-api"));
    }

    #[test]
    fn test_case_insensitive_on_both_engines() {
        assert!(HybridRegex::with_case("^prod", true)
            .unwrap()
            .is_match("PRODUCTION"));
        assert!(HybridRegex::with_case(r"^(prod)-\1$", true)
            .unwrap()
            .is_match("PROD-prod"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = HybridRegex::new("(unclosed").unwrap_err();
        assert!(matches!(err, EvalError::InvalidPattern { ref pattern, .. } if pattern == "(unclosed"));
    }
}
