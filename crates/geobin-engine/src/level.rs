//! Strategy dispatch over the single-level binner kinds
//!
//! The binner kind for a criteria level is selected once, at construction,
//! by matching on the strategy tag — there is no runtime polymorphism over a
//! binner class hierarchy.

use geobin_core::Result;

use crate::bin::{Bin, BinnerState};
use crate::period::PeriodBinner;
use crate::range::RangeBinner;
use crate::unique::UniqueValueBinner;

/// A single classification level of one of the three binner kinds
pub enum LevelBinner<T> {
    Range(RangeBinner<T>),
    Unique(UniqueValueBinner<T>),
    Period(PeriodBinner<T>),
}

impl<T> LevelBinner<T> {
    /// Find or create the bin for a record at this level
    ///
    /// `None` only for custom binners whose fixed bin set does not cover the
    /// record's value.
    pub(crate) fn route(&mut self, item: &T) -> Result<Option<(&mut Bin<T>, bool)>> {
        match self {
            LevelBinner::Range(binner) => {
                let value = binner.extract_value(item)?;
                Ok(binner.route(value))
            }
            LevelBinner::Unique(binner) => {
                let key = binner.extract_value(item)?;
                Ok(binner.route(key))
            }
            LevelBinner::Period(binner) => {
                let ts = binner.extract_value(item)?;
                Ok(Some(binner.route(ts)))
            }
        }
    }

    /// Find the record's bin at this level without creating one
    pub(crate) fn locate(&mut self, item: &T) -> Result<Option<&mut Bin<T>>> {
        match self {
            LevelBinner::Range(binner) => {
                let value = binner.extract_value(item)?;
                Ok(binner.locate(value))
            }
            LevelBinner::Unique(binner) => {
                let key = binner.extract_value(item)?;
                Ok(binner.locate(&key))
            }
            LevelBinner::Period(binner) => {
                let ts = binner.extract_value(item)?;
                Ok(binner.locate(ts))
            }
        }
    }

    /// Drop the record's bin at this level if it drained, per binner policy
    pub(crate) fn prune(&mut self, item: &T) -> Result<()> {
        match self {
            LevelBinner::Range(binner) => {
                let value = binner.extract_value(item)?;
                binner.prune(value);
            }
            LevelBinner::Unique(binner) => {
                let key = binner.extract_value(item)?;
                binner.prune(&key);
            }
            LevelBinner::Period(binner) => {
                let ts = binner.extract_value(item)?;
                binner.prune(ts);
            }
        }
        Ok(())
    }

    /// Bins at this level, in the binner's native order
    pub fn bins(&self) -> Vec<&Bin<T>> {
        match self {
            LevelBinner::Range(binner) => binner.bins(),
            LevelBinner::Unique(binner) => binner.bins(),
            LevelBinner::Period(binner) => binner.bins(),
        }
    }

    /// Number of bins at this level
    pub fn bin_count(&self) -> usize {
        match self {
            LevelBinner::Range(binner) => binner.bin_count(),
            LevelBinner::Unique(binner) => binner.bin_count(),
            LevelBinner::Period(binner) => binner.bin_count(),
        }
    }

    /// Lifecycle state of this level
    pub fn state(&self) -> BinnerState {
        match self {
            LevelBinner::Range(binner) => binner.state(),
            LevelBinner::Unique(binner) => binner.state(),
            LevelBinner::Period(binner) => binner.state(),
        }
    }
}
