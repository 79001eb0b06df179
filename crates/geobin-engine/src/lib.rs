//! Hierarchical data-binning engine
//!
//! Classifies large sets of records into nested buckets under an ordered,
//! user-configurable sequence of classification strategies: numeric ranges,
//! exact values, and time periods. Analysis views (histograms, distribution
//! charts) feed records in and read the flattened leaf bins back out.
//!
//! # Key pieces
//!
//! - [`RangeBinner`]: fixed-width numeric intervals, with optional
//!   auto-growth and empty-bin synthesis
//! - [`UniqueValueBinner`]: exact-key bucketing, null included
//! - [`PeriodBinner`]: calendar/cyclic time bucketing
//! - [`HierarchicalBinner`]: routes each record through successive levels,
//!   one single-level binner per criteria entry, exposing only leaf bins
//! - [`DecoratedBin`]: pure forwarding decorator for presentation-only state
//!
//! # Example
//!
//! ```rust
//! use geobin_core::{Criteria, CriteriaElement, Strategy, Value};
//! use geobin_engine::HierarchicalBinner;
//!
//! #[derive(PartialEq)]
//! struct Fruit {
//!     color: Option<&'static str>,
//!     taste: f64,
//! }
//!
//! let accessor = |field: &str, fruit: &Fruit| match field {
//!     "color" => Ok(fruit.color.map(Value::from)),
//!     "taste" => Ok(Some(Value::from(fruit.taste))),
//!     other => Err(geobin_core::Error::UnknownField(other.to_string())),
//! };
//!
//! let criteria = Criteria::new(vec![
//!     CriteriaElement::new("color", Strategy::Unique),
//!     CriteriaElement::new("taste", Strategy::Range { bin_width: 2.0 }),
//! ])?;
//!
//! let mut binner = HierarchicalBinner::new(criteria, accessor)?;
//! binner.add(Fruit { color: Some("red"), taste: 1.0 })?;
//! binner.add(Fruit { color: Some("red"), taste: 5.0 })?;
//! binner.add(Fruit { color: None, taste: 3.0 })?;
//!
//! assert_eq!(binner.bins().len(), 3);
//! assert_eq!(binner.len(), 3);
//! # Ok::<(), geobin_core::Error>(())
//! ```
//!
//! # Concurrency
//!
//! All operations are synchronous and run on the calling thread; the engine
//! is not internally locked. Callers serialize mutation. The snapshot
//! [`LiveCount`] handle is the one surface safe to poll concurrently.

pub mod bin;
pub mod decor;
pub mod hierarchy;
pub mod level;
pub mod period;
pub mod range;
pub mod unique;

pub use bin::{Bin, BinId, BinKey, BinnerState, PeriodKey};
pub use decor::{BinView, Color, DecoratedBin, ObservedCount};
pub use hierarchy::{HierarchicalBinner, LiveCount};
pub use level::LevelBinner;
pub use period::{period_key, PeriodBinner};
pub use range::RangeBinner;
pub use unique::UniqueValueBinner;

pub use geobin_core::{Error, Result};
