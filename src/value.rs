//! Operand values resolved by the caller from a document

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[cfg(feature = "json")]
use crate::eval::parse_time;
#[cfg(feature = "json")]
use crate::expr::DataType;

/// A resolved attribute value.
///
/// The variant must agree with the declared [`DataType`](crate::DataType) of
/// the expression it is evaluated against; a mismatch is reported as an
/// internal error.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i32),
    Int64(i64),
    Float(f64),
    Bool(bool),
    Uuid(Uuid),
    Time(DateTime<Utc>),
    UuidArray(Vec<Uuid>),
    StringMap(HashMap<String, String>),
    BoolMap(HashMap<String, bool>),
    UuidStringMap(HashMap<Uuid, String>),
}

impl Value {
    /// Variant name, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Int(_) => "int32",
            Value::Int64(_) => "int64",
            Value::Float(_) => "float64",
            Value::Bool(_) => "bool",
            Value::Uuid(_) => "uuid",
            Value::Time(_) => "time",
            Value::UuidArray(_) => "[]uuid",
            Value::StringMap(_) => "map[string]string",
            Value::BoolMap(_) => "map[string]bool",
            Value::UuidStringMap(_) => "map[uuid]string",
        }
    }

    /// Integer view of numeric values; floats are truncated toward zero
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(i64::from(*i)),
            Value::Int64(i) => Some(*i),
            Value::Float(f) => Some(f.trunc() as i64),
            _ => None,
        }
    }

    /// Element count of storage values
    pub fn element_count(&self) -> Option<usize> {
        match self {
            Value::UuidArray(v) => Some(v.len()),
            Value::StringMap(m) => Some(m.len()),
            Value::BoolMap(m) => Some(m.len()),
            Value::UuidStringMap(m) => Some(m.len()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Int64(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Uuid(u) => write!(f, "{}", u),
            Value::Time(t) => write!(f, "{}", t.to_rfc3339()),
            other => write!(f, "<{} of {}>", other.kind(), other.element_count().unwrap_or(0)),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int64(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Uuid> for Value {
    fn from(u: Uuid) -> Self {
        Value::Uuid(u)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Time(t)
    }
}

#[cfg(feature = "json")]
impl Value {
    /// Best-effort conversion of a JSON value.
    ///
    /// Objects become string or bool maps depending on their values; arrays
    /// must hold uuid strings.
    pub fn from_json(json: &serde_json::Value) -> Option<Self> {
        use serde_json::Value as Json;

        match json {
            Json::String(s) => Some(Value::String(s.clone())),
            Json::Bool(b) => Some(Value::Bool(*b)),
            Json::Number(n) => n
                .as_i64()
                .map(Value::Int64)
                .or_else(|| n.as_f64().map(Value::Float)),
            Json::Array(items) => uuid_array(items),
            Json::Object(map) => {
                if let Some(bools) = bool_map(map) {
                    return Some(bools);
                }
                // uuid keyed maps are recognized when every key parses
                match uuid_string_map(map) {
                    Some(Value::UuidStringMap(m)) if !m.is_empty() => Some(Value::UuidStringMap(m)),
                    _ => string_map(map),
                }
            }
            Json::Null => None,
        }
    }

    /// Convert a JSON value for an attribute declared as `data_type`.
    ///
    /// JSON has no uuid or timestamp type, and an empty object says nothing
    /// about its map type, so the declaration decides. A value that does not
    /// fit the declaration falls back to [`Value::from_json`], and evaluation
    /// then reports the mismatch.
    pub fn from_json_as(json: &serde_json::Value, data_type: DataType) -> Option<Self> {
        use serde_json::Value as Json;

        let typed = match (data_type, json) {
            (DataType::Uuid, Json::String(s)) => Uuid::parse_str(s).ok().map(Value::Uuid),
            (DataType::Time, Json::String(s)) => parse_time(s).ok().map(Value::Time),
            (DataType::UuidArray, Json::Array(items)) => uuid_array(items),
            (DataType::StringMap, Json::Object(map)) => string_map(map),
            (DataType::BoolMap, Json::Object(map)) => bool_map(map),
            (DataType::UuidStringMap, Json::Object(map)) => uuid_string_map(map),
            _ => None,
        };
        typed.or_else(|| Self::from_json(json))
    }
}

#[cfg(feature = "json")]
fn uuid_array(items: &[serde_json::Value]) -> Option<Value> {
    items
        .iter()
        .map(|item| item.as_str().and_then(|s| Uuid::parse_str(s).ok()))
        .collect::<Option<Vec<_>>>()
        .map(Value::UuidArray)
}

#[cfg(feature = "json")]
fn string_map(map: &serde_json::Map<String, serde_json::Value>) -> Option<Value> {
    map.iter()
        .map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
        .collect::<Option<HashMap<_, _>>>()
        .map(Value::StringMap)
}

#[cfg(feature = "json")]
fn bool_map(map: &serde_json::Map<String, serde_json::Value>) -> Option<Value> {
    map.iter()
        .map(|(k, v)| v.as_bool().map(|b| (k.clone(), b)))
        .collect::<Option<HashMap<_, _>>>()
        .map(Value::BoolMap)
}

#[cfg(feature = "json")]
fn uuid_string_map(map: &serde_json::Map<String, serde_json::Value>) -> Option<Value> {
    map.iter()
        .map(|(k, v)| {
            let key = Uuid::parse_str(k).ok()?;
            v.as_str().map(|s| (key, s.to_string()))
        })
        .collect::<Option<HashMap<_, _>>>()
        .map(Value::UuidStringMap)
}
