use chrono::{DateTime, Utc};

use crate::langstring::LangString;

/// Scalar kinds a [`Value`] can carry.
///
/// Lists and the null marker have no kind of their own; they are matched
/// structurally by [`TypeDescriptor`](crate::validation::TypeDescriptor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Integer,
    Float,
    Text,
    LangString,
    Timestamp,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueKind::Bool => "bool",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::Text => "text",
            ValueKind::LangString => "langstring",
            ValueKind::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

/// A dynamically typed attribute value, as passed through the name-indexed
/// attribute API.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Explicit absence. Distinct from an empty list.
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    LangString(LangString),
    Timestamp(DateTime<Utc>),
    List(Vec<Value>),
}

impl Value {
    /// Build a list value from anything convertible into values.
    pub fn list<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// The empty list.
    pub fn empty_list() -> Self {
        Value::List(Vec::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Scalar kind of this value, `None` for null and lists.
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Value::Bool(_) => Some(ValueKind::Bool),
            Value::Integer(_) => Some(ValueKind::Integer),
            Value::Float(_) => Some(ValueKind::Float),
            Value::Text(_) => Some(ValueKind::Text),
            Value::LangString(_) => Some(ValueKind::LangString),
            Value::Timestamp(_) => Some(ValueKind::Timestamp),
            Value::Null | Value::List(_) => None,
        }
    }

    /// Human-readable type name, used in mismatch errors.
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::List(_) => "list".to_string(),
            other => other
                .kind()
                .map(|k| k.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<LangString> for Value {
    fn from(v: LangString) -> Self {
        Value::LangString(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::list(v)
    }
}

/// Typed extraction out of a [`Value`]. Returns `None` on a shape mismatch.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Option<Self>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Integer(v) => Some(v),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(v),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl FromValue for LangString {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::LangString(v) => Some(v),
            _ => None,
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Timestamp(v) => Some(v),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}
