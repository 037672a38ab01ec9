//! Dynamic field values
//!
//! Provides [`Value`] (the payload of a field node), [`ValueType`] (its
//! runtime type, used for type-compatibility checks) and [`Object`], the
//! composite value every component exposes as its field tree root.

use crate::severity::Severity;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// A field value inside a component's field tree
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Unset reference
    #[default]
    Null,

    /// Boolean
    Bool(bool),

    /// Signed integer
    Int(i64),

    /// Floating point number
    Float(f64),

    /// Text
    Str(String),

    /// Severity, used by condition methods that report one
    Severity(Severity),

    /// Array / list; elements are child field nodes
    List(Vec<Value>),

    /// Nested structure; fields are child field nodes
    Object(Object),
}

impl Value {
    /// Runtime type of this value
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Null => ValueType::Null,
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::Float(_) => ValueType::Float,
            Self::Str(_) => ValueType::Str,
            Self::Severity(_) => ValueType::Severity,
            Self::List(_) => ValueType::List,
            Self::Object(o) => ValueType::Object(Some(o.type_name().to_string())),
        }
    }

    /// Boolean payload, if any
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer payload, if any
    #[inline]
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Text payload, if any
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Severity payload, if any
    #[inline]
    #[must_use]
    pub fn as_severity(&self) -> Option<Severity> {
        match self {
            Self::Severity(s) => Some(*s),
            _ => None,
        }
    }

    /// List payload, if any
    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Mutable list payload, if any
    #[inline]
    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Object payload, if any
    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Mutable object payload, if any
    #[inline]
    pub fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// True for lists
    #[inline]
    #[must_use]
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// True for values that expose child field nodes
    #[inline]
    #[must_use]
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::List(_) | Self::Object(_))
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => write!(f, "\"{s}\""),
            Self::Severity(s) => write!(f, "{s}"),
            Self::List(items) => write!(f, "[{} items]", items.len()),
            Self::Object(o) => write!(f, "{}", o.type_name()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Severity> for Value {
    fn from(s: Severity) -> Self {
        Self::Severity(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Self::Object(o)
    }
}

/// Runtime type of a [`Value`], also used to declare member and parameter types
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// Accepts every value
    Any,

    /// Type of [`Value::Null`]
    Null,

    /// Boolean
    Bool,

    /// Integer
    Int,

    /// Float (also accepts integers)
    Float,

    /// Text
    Str,

    /// Severity
    Severity,

    /// List of any element type
    List,

    /// Object, optionally of a specific type name
    Object(Option<String>),
}

impl ValueType {
    /// Whether a value of type `source` can be passed where `self` is expected
    #[must_use]
    pub fn is_assignable_from(&self, source: &ValueType) -> bool {
        match (self, source) {
            (Self::Any, _) => true,
            (Self::Float, Self::Int | Self::Float) => true,
            (Self::Object(_), Self::Null) => true,
            (Self::Object(None), Self::Object(_)) => true,
            (Self::Object(Some(expected)), Self::Object(Some(actual))) => expected == actual,
            (expected, actual) => expected == actual,
        }
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Null => f.write_str("null"),
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Str => f.write_str("string"),
            Self::Severity => f.write_str("severity"),
            Self::List => f.write_str("list"),
            Self::Object(Some(name)) => f.write_str(name),
            Self::Object(None) => f.write_str("object"),
        }
    }
}

/// Composite value with a runtime type name and ordered named fields
///
/// Field order is insertion order; traversal relies on it for determinism.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    #[serde(rename = "$type")]
    type_name: String,

    #[serde(flatten)]
    fields: IndexMap<String, Value>,
}

impl Object {
    /// Create an empty object of the given type
    #[inline]
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: IndexMap::new(),
        }
    }

    /// Builder-style field insertion
    #[inline]
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Runtime type name
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Field value by name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Field name and value by name, both borrowed from the object
    #[inline]
    #[must_use]
    pub fn get_entry(&self, name: &str) -> Option<(&str, &Value)> {
        self.fields
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Mutable field value by name
    #[inline]
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    /// Set a field, returning the previous value
    #[inline]
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    /// Whether the object has a field with this name
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterate fields in declaration order
    #[inline]
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the object has no fields
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
