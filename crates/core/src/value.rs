//! Attribute values and concepts
//!
//! Every value variant has exactly one canonical string form, so the token a
//! value hashes to is portable across processes and reimplementations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::EncodingError;

/// Largest integer an f64 represents exactly
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Heterogeneous attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    String(String),
    Number(f64),
    Bool(bool),
    List(Vec<Value>),
}

impl Value {
    /// Canonical token for this value
    pub fn canonical(&self) -> Result<String, EncodingError> {
        match self {
            Value::String(s) => Ok(format!("s:{s}")),
            Value::Number(n) => canonical_number(*n).map(|n| format!("n:{n}")),
            Value::Bool(b) => Ok(format!("b:{b}")),
            Value::List(items) => {
                // length-prefixed elements keep the token injective
                let parts = items
                    .iter()
                    .map(|item| item.canonical().map(|c| format!("{}:{c}", c.len())))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("l:[{}]", parts.join(",")))
            }
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

fn canonical_number(n: f64) -> Result<String, EncodingError> {
    if !n.is_finite() {
        return Err(EncodingError::NonFiniteNumber(n));
    }
    if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER {
        // -0.0 and 0.0 share a token
        return Ok(format!("{}", n as i64));
    }
    Ok(format!("{n}"))
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
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

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = EncodingError;

    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        match json {
            serde_json::Value::String(s) => Ok(Value::String(s)),
            serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(Value::Number)
                .ok_or_else(|| EncodingError::UnsupportedValue(n.to_string())),
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(Value::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            serde_json::Value::Null => Err(EncodingError::UnsupportedValue("null".to_string())),
            serde_json::Value::Object(_) => {
                Err(EncodingError::UnsupportedValue("object".to_string()))
            }
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
        }
    }
}

/// Attribute map, ordered by key
pub type Attributes = BTreeMap<String, Value>;

/// A named bundle of attributes to encode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    pub name: String,
    pub attributes: Attributes,
}

impl Concept {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Attributes::new(),
        }
    }

    /// Builder-style attribute insertion
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Parse `{"name": ..., "attributes": {...}}` with plain JSON values
    pub fn from_json(json: serde_json::Value) -> Result<Self, EncodingError> {
        let mut object = match json {
            serde_json::Value::Object(map) => map,
            other => return Err(EncodingError::UnsupportedValue(other.to_string())),
        };
        let name = match object.remove("name") {
            Some(serde_json::Value::String(name)) => name,
            _ => return Err(EncodingError::UnsupportedValue("missing concept name".to_string())),
        };
        let mut concept = Concept::new(name);
        if let Some(serde_json::Value::Object(attributes)) = object.remove("attributes") {
            for (key, value) in attributes {
                concept.attributes.insert(key, Value::try_from(value)?);
            }
        }
        Ok(concept)
    }
}
