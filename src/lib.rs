//! Hierarchical data-binning for analysis views
//!
//! `geobin` classifies sets of records into nested buckets under an ordered,
//! user-configurable sequence of classification strategies: exact-value
//! grouping, fixed-width numeric ranges, and calendar/cyclic time periods.
//! Histogram and distribution views feed records in through a field-value
//! accessor and read the flattened leaf bins back out.
//!
//! This facade crate re-exports the workspace members:
//!
//! - [`geobin_core`]: errors, typed field values, accessors, criteria model
//! - [`geobin_engine`]: the binners themselves
//!
//! # Example
//!
//! ```rust
//! use geobin::{Criteria, CriteriaElement, HierarchicalBinner, Strategy, Value};
//!
//! let accessor = |field: &str, value: &f64| match field {
//!     "value" => Ok(Some(Value::from(*value))),
//!     other => Err(geobin::Error::UnknownField(other.to_string())),
//! };
//!
//! let criteria = Criteria::single("value", Strategy::Range { bin_width: 10.0 })?;
//! let mut binner = HierarchicalBinner::new(criteria, accessor)?;
//! binner.add_all(vec![0.0, 3.5, 10.0, 33.0, 34.0])?;
//!
//! let bins = binner.bins();
//! assert_eq!(bins.len(), 3); // [0,10) x2, [10,20) x1, [30,40) x2
//! assert_eq!(bins[2].len(), 2);
//! # Ok::<(), geobin::Error>(())
//! ```

pub use geobin_core;
pub use geobin_engine;

pub use geobin_core::{
    Criteria, CriteriaElement, Error, FieldAccessor, PeriodUnit, Result, Strategy, Value,
};
pub use geobin_engine::{
    Bin, BinId, BinKey, BinView, BinnerState, Color, DecoratedBin, HierarchicalBinner, LevelBinner,
    LiveCount, ObservedCount, PeriodBinner, PeriodKey, RangeBinner, UniqueValueBinner,
};
