//! Core types for the geobin binning engine
//!
//! This crate carries everything the binning engine and its callers share:
//! the error taxonomy, the typed [`Value`] model, the [`FieldAccessor`]
//! interface through which records are read, and the immutable [`Criteria`]
//! configuration describing how a dataset is progressively subdivided.
//!
//! The engine itself lives in `geobin-engine`.

pub mod accessor;
pub mod criteria;
pub mod error;
pub mod value;

pub use accessor::FieldAccessor;
pub use criteria::{Criteria, CriteriaElement, PeriodUnit, Strategy};
pub use error::{Error, Result};
pub use value::Value;
