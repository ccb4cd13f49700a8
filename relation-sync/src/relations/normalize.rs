//! Value normalization. Collapses host cell values into canonical primitives.
//!
//! Hosts hand cell values over as wrappers (`{ icon, data }`) whose `data`
//! is a primitive, a list of further wrappers, or occasionally another
//! wrapper. Everything downstream only ever sees [`CanonicalValue`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A cell value as the host delivers it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum HostValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<HostValue>),
    /// Host wrapper exposing an inner `data` field
    Wrapped { data: Box<HostValue> },
    /// Any other object; `repr` is its custom textual form, if it has one
    Object { repr: Option<String> },
}

impl HostValue {
    pub fn wrap(data: HostValue) -> Self {
        HostValue::Wrapped {
            data: Box::new(data),
        }
    }
}

impl From<Value> for HostValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => HostValue::Null,
            Value::Bool(b) => HostValue::Bool(b),
            Value::Number(n) => n.as_f64().map(HostValue::Number).unwrap_or(HostValue::Null),
            Value::String(s) => HostValue::Text(s),
            Value::Array(items) => {
                HostValue::List(items.into_iter().map(HostValue::from).collect())
            }
            Value::Object(mut map) => {
                if let Some(data) = map.remove("data") {
                    return HostValue::wrap(HostValue::from(data));
                }
                let repr = ["repr", "toString"]
                    .iter()
                    .find_map(|key| map.get(*key).and_then(Value::as_str))
                    .map(str::to_string);
                HostValue::Object { repr }
            }
        }
    }
}

/// Canonical cell value: null, bool, number, string, or an ordered list of those.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CanonicalValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<CanonicalValue>),
}

/// Unwrap a host value. Total: unrecognized shapes become their string form or null.
pub fn normalize(value: &HostValue) -> CanonicalValue {
    match value {
        HostValue::Null => CanonicalValue::Null,
        HostValue::Bool(b) => CanonicalValue::Bool(*b),
        HostValue::Number(n) => CanonicalValue::Number(*n),
        HostValue::Text(s) => CanonicalValue::String(s.clone()),
        HostValue::List(items) => CanonicalValue::List(items.iter().map(normalize).collect()),
        // `data` may itself be a list of wrappers or a nested wrapper
        HostValue::Wrapped { data } => normalize(data),
        HostValue::Object { repr } => repr
            .as_ref()
            .map(|s| CanonicalValue::String(s.clone()))
            .unwrap_or(CanonicalValue::Null),
    }
}

impl CanonicalValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CanonicalValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CanonicalValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[CanonicalValue]> {
        match self {
            CanonicalValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// String elements of a list value; empty for anything else.
    pub fn string_items(&self) -> Vec<String> {
        self.as_list()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Convert for frontmatter storage. Integral numbers are written as integers.
    pub fn to_json(&self) -> Value {
        match self {
            CanonicalValue::Null => Value::Null,
            CanonicalValue::Bool(b) => Value::Bool(*b),
            CanonicalValue::Number(n) => {
                if is_integral(*n) {
                    Value::from(*n as i64)
                } else {
                    serde_json::Number::from_f64(*n)
                        .map(Value::Number)
                        .unwrap_or(Value::Null)
                }
            }
            CanonicalValue::String(s) => Value::String(s.clone()),
            CanonicalValue::List(items) => {
                Value::Array(items.iter().map(|v| v.to_json()).collect())
            }
        }
    }
}

impl From<&Value> for CanonicalValue {
    fn from(value: &Value) -> Self {
        normalize(&HostValue::from(value.clone()))
    }
}

impl From<&str> for CanonicalValue {
    fn from(s: &str) -> Self {
        CanonicalValue::String(s.to_string())
    }
}

fn is_integral(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15
}

/// Table-cell display form.
impl fmt::Display for CanonicalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalValue::Null => Ok(()),
            CanonicalValue::Bool(b) => write!(f, "{}", b),
            CanonicalValue::Number(n) if is_integral(*n) => write!(f, "{}", *n as i64),
            CanonicalValue::Number(n) => write!(f, "{}", n),
            CanonicalValue::String(s) => f.write_str(s),
            CanonicalValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}
