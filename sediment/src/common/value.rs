use crate::collection::Document;
use std::fmt::{Display, Formatter};

/// Represents a dynamically typed value stored in a document or in the
/// underlying key/value store.
///
/// `Value` covers the types this layer actually stores: scalars for document
/// fields, strings for keys and members, and nested documents for the primary
/// hash write. Two renderings matter for indexing:
///
/// * [`Value::as_key_part`] - the canonical string form used for hash index
///   fields, sorted-set members, and `$` template substitution
/// * [`Value::as_score`] - the numeric (epoch milliseconds) form used as a
///   sorted-set score
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// Represents a null value.
    #[default]
    Null,
    /// Represents a boolean value.
    Bool(bool),
    /// Represents a signed 64-bit integer value.
    I64(i64),
    /// Represents an unsigned 64-bit integer value.
    U64(u64),
    /// Represents a 64-bit floating point value.
    F64(f64),
    /// Represents a string value.
    String(String),
    /// Represents an array of values.
    Array(Vec<Value>),
    /// Represents a nested document.
    Document(Document),
}

impl Value {
    /// Checks whether this value is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the contained string, if this is a `String` value.
    pub fn as_string(&self) -> Option<&String> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the contained boolean, if this is a `Bool` value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the contained document, if this is a `Document` value.
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// Returns the numeric form of this value as a signed 64-bit integer.
    ///
    /// This is the rendering used for sorted-set scores (epoch milliseconds).
    /// Floats are truncated; unsigned values larger than `i64::MAX` are
    /// rejected.
    ///
    /// # Returns
    /// * `Some(score)` for `I64`, in-range `U64`, and `F64` values
    /// * `None` for every other variant
    pub fn as_score(&self) -> Option<i64> {
        match self {
            Value::I64(v) => Some(*v),
            Value::U64(v) => i64::try_from(*v).ok(),
            Value::F64(v) => Some(*v as i64),
            _ => None,
        }
    }

    /// Returns the canonical string rendering used for key construction.
    ///
    /// Hash index fields, sorted-set members, and `$` template substitutions
    /// all go through this rendering, so a field indexed one way can always be
    /// looked up the same way.
    ///
    /// # Returns
    /// * `Some(text)` for `String`, `Bool`, and numeric values
    /// * `None` for `Null`, `Array`, and `Document` values
    pub fn as_key_part(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::I64(v) => Some(v.to_string()),
            Value::U64(v) => Some(v.to_string()),
            Value::F64(v) => Some(v.to_string()),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::I64(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(values) => write!(f, "{:?}", values),
            Value::Document(doc) => write!(f, "{:?}", doc),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::I64(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::I64(value as i64)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::U64(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<Document> for Value {
    fn from(value: Document) -> Self {
        Value::Document(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}
