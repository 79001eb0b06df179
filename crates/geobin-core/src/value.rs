//! Typed field values yielded by accessors
//!
//! A [`Value`] is what a field-value accessor hands the engine for one record
//! and one field. Values are totally ordered and hashable so they can serve
//! directly as exact bucket keys; floats are wrapped in [`OrderedFloat`] for
//! that purpose. Key equality is value equality, never instance identity.

use chrono::{DateTime, Utc};
use num_traits::ToPrimitive;
use ordered_float::OrderedFloat;
use std::fmt;

/// A typed field value extracted from a record
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value {
    /// Boolean flag
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating-point number (total order via `OrderedFloat`)
    Float(OrderedFloat<f64>),
    /// Text
    Text(String),
    /// Point in time (UTC)
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Construct a float value
    pub fn float(v: f64) -> Self {
        Value::Float(OrderedFloat(v))
    }

    /// Construct a text value
    pub fn text(v: impl Into<String>) -> Self {
        Value::Text(v.into())
    }

    /// Numeric view of this value, if it has one
    ///
    /// Integers and floats coerce; text, booleans and timestamps do not.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => v.to_f64(),
            Value::Float(v) => Some(v.into_inner()),
            _ => None,
        }
    }

    /// Timestamp view of this value, if it is one
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Name of the value's type, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Timestamp(_) => "timestamp",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "{v}"),
            Value::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
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
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::text(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}
