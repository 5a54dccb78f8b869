//! Attribute path grammar
//!
//! Handles paths like:
//! - `metadata.namespace` → [Key("metadata"), Key("namespace")]
//! - `spec.containers.0.image` → [Key("spec"), Key("containers"), Index(0), Key("image")]
//! - `spec.containers.*.image` → [.., Wildcard { .. }, ..]
//! - `spec.containers.?name=main.image` → [.., Associative { key: "name", value: "main", .. }, ..]
//! - `spec.template.|spec.volumes` → split: the prefix must exist, the suffix may not
//!
//! Validation is purely syntactic: paths are never resolved against a document here.

use pest::iterators::Pair;

use super::error::ParseError;
use super::raw::{lex, Rule};
use crate::expr::SplitPath;

/// A single decoded path segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Plain map key
    Key(String),
    /// `@key:param`, a key whose name is bound to a parameter
    BoundKey { key: String, param: String },
    /// Purely numeric segment: array index
    Index(usize),
    /// `*`, `*?key[:param]` or `*@:param`
    Wildcard {
        key: Option<String>,
        param: Option<String>,
    },
    /// `?key[:param]=value`, array element located by a field value
    Associative {
        key: String,
        param: Option<String>,
        value: String,
    },
}

/// A validated path, decomposed into segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributePath {
    raw: String,
    segments: Vec<PathSegment>,
    split_at: Option<usize>,
    embedded: Option<String>,
}

impl AttributePath {
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Segments that must exist when the path was written with `.|`
    pub fn required_segments(&self) -> &[PathSegment] {
        match self.split_at {
            Some(at) => &self.segments[..at],
            None => &self.segments,
        }
    }

    /// Segments after the split marker, which may be absent
    pub fn optional_segments(&self) -> &[PathSegment] {
        match self.split_at {
            Some(at) => &self.segments[at..],
            None => &[],
        }
    }

    pub fn is_split(&self) -> bool {
        self.split_at.is_some()
    }

    /// Accessor after a trailing `#`, addressing inside an embedded document
    pub fn embedded(&self) -> Option<&str> {
        self.embedded.as_deref()
    }
}

/// Path as matched at the head of a binary expression
#[derive(Debug)]
pub(crate) struct MatchedAttribute<'a> {
    pub path: &'a str,
    pub is_length: bool,
    pub split: Option<SplitPath>,
}

/// Match the longest valid attribute, optionally wrapped in `LEN(...)`
pub(crate) fn lex_attribute(input: &str) -> Option<(MatchedAttribute<'_>, &str)> {
    let (pair, rest) = lex(Rule::attribute, input)?;
    let inner = pair.into_inner().next()?;

    let (path_pair, is_length) = match inner.as_rule() {
        Rule::length_path => (inner.into_inner().next()?, true),
        _ => (inner, false),
    };

    let path = path_pair.as_str();
    let split = path.split_once(".|").map(|(visitor, sub)| SplitPath {
        visitor_path: visitor.to_string(),
        sub_path: sub.to_string(),
    });

    Some((
        MatchedAttribute {
            path,
            is_length,
            split,
        },
        rest,
    ))
}

/// Validate and decompose a complete path string
pub fn parse_path(input: &str) -> Result<AttributePath, ParseError> {
    let (pair, rest) = lex(Rule::path, input).ok_or_else(|| ParseError::invalid_path(input, input))?;
    if !rest.is_empty() {
        return Err(ParseError::invalid_path(input, rest));
    }

    let raw = pair.as_str().to_string();
    let mut segments = Vec::new();
    let mut split_at = None;
    let mut embedded = None;

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::segments => {
                for segment in part.into_inner() {
                    segments.push(decode_segment(segment));
                }
            }
            Rule::split => split_at = Some(segments.len()),
            Rule::embedded => {
                embedded = part.into_inner().next().map(|key| unescape(key.as_str()));
            }
            _ => {}
        }
    }

    Ok(AttributePath {
        raw,
        segments,
        split_at,
        embedded,
    })
}

fn decode_segment(pair: Pair<'_, Rule>) -> PathSegment {
    match pair.as_rule() {
        Rule::bound_key => {
            let (key, param) = key_and_param(pair);
            PathSegment::BoundKey {
                key: key.unwrap_or_default(),
                param: param.unwrap_or_default(),
            }
        }
        Rule::wildcard => match pair.into_inner().next() {
            Some(form) => {
                let (key, param) = key_and_param(form);
                PathSegment::Wildcard { key, param }
            }
            None => PathSegment::Wildcard {
                key: None,
                param: None,
            },
        },
        Rule::associative => {
            let mut key = String::new();
            let mut param = None;
            let mut value = String::new();
            for part in pair.into_inner() {
                match part.as_rule() {
                    Rule::key => key = unescape(part.as_str()),
                    Rule::param_name => param = Some(part.as_str().to_string()),
                    Rule::assoc_value => value = unescape(part.as_str()),
                    _ => {}
                }
            }
            PathSegment::Associative { key, param, value }
        }
        _ => {
            let text = pair.as_str();
            match text.parse::<usize>() {
                Ok(index) if text.bytes().all(|b| b.is_ascii_digit()) => PathSegment::Index(index),
                _ => PathSegment::Key(unescape(text)),
            }
        }
    }
}

fn key_and_param(pair: Pair<'_, Rule>) -> (Option<String>, Option<String>) {
    let mut key = None;
    let mut param = None;
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::key => key = Some(unescape(part.as_str())),
            Rule::param_name => param = Some(part.as_str().to_string()),
            _ => {}
        }
    }
    (key, param)
}

/// `~1` stands for `/` and `~2` for `.` inside a key
fn unescape(key: &str) -> String {
    key.replace("~1", "/").replace("~2", ".")
}
