//! Caveats: named, context-parameterized conditions on relationships.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A value that can be passed in a caveat context.
///
/// Caveat contexts parameterize the named condition the service evaluates
/// at check time. They support the common JSON-compatible types.
///
/// # Example
///
/// ```rust
/// use relish::CaveatValue;
///
/// let string_val: CaveatValue = "production".into();
/// let number_val: CaveatValue = 42.into();
/// let bool_val: CaveatValue = true.into();
/// let null_val = CaveatValue::Null;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CaveatValue {
    /// Null value.
    #[default]
    Null,

    /// Boolean value.
    Bool(bool),

    /// Integer value (64-bit signed).
    Integer(i64),

    /// Floating-point value (64-bit).
    Float(f64),

    /// String value.
    String(String),

    /// Array of values.
    Array(Vec<CaveatValue>),

    /// Nested object.
    Object(HashMap<String, CaveatValue>),
}

impl CaveatValue {
    /// Returns `true` if this is a null value.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, CaveatValue::Null)
    }

    /// Returns the boolean value if this is a Bool variant.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CaveatValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer value if this is an Integer variant.
    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CaveatValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the float value if this is a Float or Integer variant.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CaveatValue::Float(f) => Some(*f),
            CaveatValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Returns the string value if this is a String variant.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CaveatValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for CaveatValue {
    fn from(value: bool) -> Self {
        CaveatValue::Bool(value)
    }
}

impl From<i32> for CaveatValue {
    fn from(value: i32) -> Self {
        CaveatValue::Integer(value as i64)
    }
}

impl From<i64> for CaveatValue {
    fn from(value: i64) -> Self {
        CaveatValue::Integer(value)
    }
}

impl From<f64> for CaveatValue {
    fn from(value: f64) -> Self {
        CaveatValue::Float(value)
    }
}

impl From<&str> for CaveatValue {
    fn from(value: &str) -> Self {
        CaveatValue::String(value.to_owned())
    }
}

impl From<String> for CaveatValue {
    fn from(value: String) -> Self {
        CaveatValue::String(value)
    }
}

impl<T: Into<CaveatValue>> From<Vec<T>> for CaveatValue {
    fn from(value: Vec<T>) -> Self {
        CaveatValue::Array(value.into_iter().map(Into::into).collect())
    }
}

/// A named caveat with its evaluation context.
///
/// A caveated relationship only counts at check time if the named
/// condition, evaluated against the context, is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caveat {
    /// Name of the caveat definition in the schema.
    name: String,

    /// Context values the condition is evaluated against.
    #[serde(default)]
    context: HashMap<String, CaveatValue>,
}

impl Caveat {
    /// Creates a caveat with the given name and context.
    pub fn new(
        name: impl Into<String>,
        context: impl IntoIterator<Item = (String, CaveatValue)>,
    ) -> Self {
        Self {
            name: name.into(),
            context: context.into_iter().collect(),
        }
    }

    /// Returns the caveat name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the caveat context.
    #[inline]
    pub fn context(&self) -> &HashMap<String, CaveatValue> {
        &self.context
    }
}

impl fmt::Display for Caveat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
