//! Property values for chain elements.
//!
//! Values are the atomic data stored in element properties. Besides scalars,
//! an element may reference another element of the same chain through
//! `ElementRef` (a reuse reference pointing at its reuse element, for example).

use crate::ElementId;
use serde::Serialize;
use std::fmt;

/// A value that can be stored in an element property.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Null/missing value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Reference to another element of the chain.
    ElementRef(ElementId),
    /// List of values.
    List(Vec<Value>),
}

impl Value {
    /// Returns true if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get as boolean if this is a Bool value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as integer if this is an Int value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as float if this is a Float value.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as string reference if this is a String value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as element ID if this is an ElementRef value.
    pub fn as_element_ref(&self) -> Option<ElementId> {
        match self {
            Value::ElementRef(id) => Some(*id),
            _ => None,
        }
    }

    /// Interpret the value as a sequence index.
    ///
    /// Integers are taken as-is and numeric strings are parsed, since priorities
    /// arrive from clients as either.
    pub fn as_index(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Returns true if this value points at `id`, directly or inside a list.
    pub fn references(&self, id: ElementId) -> bool {
        match self {
            Value::ElementRef(target) => *target == id,
            Value::List(items) => items.iter().any(|item| item.references(id)),
            _ => false,
        }
    }

    /// Copy of this value without references to `ids`.
    ///
    /// Returns `None` when nothing is left: a dropped reference or a list
    /// whose every item was dropped.
    pub fn without_references(&self, ids: &[ElementId]) -> Option<Value> {
        match self {
            Value::ElementRef(target) if ids.contains(target) => None,
            Value::List(items) => {
                let kept: Vec<Value> = items
                    .iter()
                    .filter_map(|item| item.without_references(ids))
                    .collect();
                (!kept.is_empty()).then_some(Value::List(kept))
            }
            other => Some(other.clone()),
        }
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::ElementRef(_) => "ElementRef",
            Value::List(_) => "List",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::ElementRef(id) => write!(f, "#{}", id),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

// Convenient From implementations
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<ElementId> for Value {
    fn from(id: ElementId) -> Self {
        Value::ElementRef(id)
    }
}

/// Type alias for property storage.
pub type Properties = std::collections::BTreeMap<String, Value>;

/// Helper macro to create property maps.
#[macro_export]
macro_rules! props {
    () => {
        std::collections::BTreeMap::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        {
            let mut map = std::collections::BTreeMap::new();
            $(
                map.insert($key.to_string(), $crate::Value::from($value));
            )+
            map
        }
    };
}
