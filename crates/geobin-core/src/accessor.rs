//! Field-value accessor interface
//!
//! The engine never inspects records directly; the owning data layer supplies
//! an accessor that maps a field name and a record to a typed value (or
//! `None` for null). The record type stays fully opaque to the engine.

use crate::error::Result;
use crate::value::Value;

/// Yields the typed value of a named field for a record
///
/// Returning `Ok(None)` means the field is null for this record — a valid,
/// distinct classification key. Unknown fields should be reported via
/// [`Error::UnknownField`](crate::Error::UnknownField).
pub trait FieldAccessor<T> {
    /// Extract the value of `field` from `record`
    fn value(&self, field: &str, record: &T) -> Result<Option<Value>>;
}

impl<T, F> FieldAccessor<T> for F
where
    F: Fn(&str, &T) -> Result<Option<Value>>,
{
    fn value(&self, field: &str, record: &T) -> Result<Option<Value>> {
        self(field, record)
    }
}
