//! # Attribute Values
//!
//! [`AttrValue`] is the typed, post-coercion form of a single attribute
//! value. [`CleanedData`] is the typed form of a whole validated object; it
//! is what cross-field hooks receive, before values are rendered back to
//! their JSON storage representation.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde_json::Value;

/// A typed scalar value produced by coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// UTF-8 text.
    String(String),
    /// Boolean.
    Boolean(bool),
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit float.
    Float(f64),
    /// Fixed-point decimal.
    Decimal(Decimal),
}

impl AttrValue {
    /// Plain JSON rendering of this value. Decimals render as text.
    pub fn to_json(&self) -> Value {
        match self {
            AttrValue::String(s) => Value::String(s.clone()),
            AttrValue::Boolean(b) => Value::Bool(*b),
            AttrValue::Integer(i) => Value::from(*i),
            AttrValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            AttrValue::Decimal(d) => Value::String(d.to_string()),
        }
    }

    /// Text form used in user-facing messages: strings are quoted.
    pub fn repr(&self) -> String {
        match self {
            AttrValue::String(s) => format!("'{s}'"),
            other => other.to_string(),
        }
    }

    /// The text, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// The boolean, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// The integer, if this is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value as a float; integers widen.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Integer(i) => Some(*i as f64),
            AttrValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// The decimal, if this is a decimal.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            AttrValue::Decimal(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::String(s) => f.write_str(s),
            AttrValue::Boolean(b) => write!(f, "{b}"),
            AttrValue::Integer(i) => write!(f, "{i}"),
            AttrValue::Float(x) => write!(f, "{x}"),
            AttrValue::Decimal(d) => write!(f, "{d}"),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::String(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::String(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Boolean(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Integer(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Integer(i64::from(value))
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<Decimal> for AttrValue {
    fn from(value: Decimal) -> Self {
        AttrValue::Decimal(value)
    }
}

impl TryFrom<&Value> for AttrValue {
    type Error = String;

    /// Read a JSON scalar literal. Numbers become integers when whole,
    /// floats otherwise; decimals stay text until an attribute claims them.
    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(AttrValue::String(s.clone())),
            Value::Bool(b) => Ok(AttrValue::Boolean(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(AttrValue::Integer(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(AttrValue::Float(f))
                } else {
                    Err(format!("unsupported number {n}"))
                }
            }
            other => Err(format!("expected a scalar literal, found {other}")),
        }
    }
}

/// Typed values of a validated object, keyed by attribute name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanedData {
    values: BTreeMap<String, AttrValue>,
}

impl CleanedData {
    /// Create an empty set of cleaned values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value of `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: AttrValue) {
        self.values.insert(name.into(), value);
    }

    /// The value of `name`, if present.
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.values.get(name)
    }

    /// Returns true if `name` has a value.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if there are no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttrValue::as_str)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(AttrValue::as_bool)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(AttrValue::as_i64)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(AttrValue::as_f64)
    }

    pub fn get_decimal(&self, name: &str) -> Option<Decimal> {
        self.get(name).and_then(AttrValue::as_decimal)
    }
}

impl<K: Into<String>> FromIterator<(K, AttrValue)> for CleanedData {
    fn from_iter<I: IntoIterator<Item = (K, AttrValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
