//! Criteria model: how a dataset is progressively subdivided
//!
//! A [`Criteria`] is an ordered sequence of (field, strategy) pairs. Each
//! element describes one classification level; the engine routes every record
//! through level 0, then level 1 within its level-0 bucket, and so on.
//! Criteria are immutable once bound to a binner — changing them means
//! constructing a new binner.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// How one level subdivides records
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Strategy {
    /// Numeric bucketing into fixed-width intervals aligned to the zero origin
    Range { bin_width: f64 },
    /// Exact-value bucketing; every distinct value (including null) is a bucket
    Unique,
    /// Calendar or cyclic time bucketing
    Period { unit: PeriodUnit },
}

impl Strategy {
    /// Fail fast on configurations that can never classify anything
    pub fn validate(&self) -> Result<()> {
        match self {
            Strategy::Range { bin_width } => Error::check_bin_width(*bin_width),
            Strategy::Unique | Strategy::Period { .. } => Ok(()),
        }
    }
}

/// Time unit for the Period strategy
///
/// Calendar units bucket by truncated period start; cyclic units fold time
/// onto a repeating axis (e.g. all Mondays share one bucket).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodUnit {
    Hour,
    Day,
    Week,
    Month,
    Year,
    HourOfDay,
    DayOfWeek,
    MonthOfYear,
}

impl PeriodUnit {
    /// True for units that fold onto a repeating axis
    pub fn is_cyclic(&self) -> bool {
        matches!(
            self,
            PeriodUnit::HourOfDay | PeriodUnit::DayOfWeek | PeriodUnit::MonthOfYear
        )
    }
}

/// One classification level: a field name plus the strategy applied to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriteriaElement {
    field: String,
    strategy: Strategy,
}

impl CriteriaElement {
    /// Create a new criteria element
    pub fn new(field: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            field: field.into(),
            strategy,
        }
    }

    /// Field this level classifies on
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Strategy applied at this level
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }
}

/// Ordered, validated sequence of classification levels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criteria {
    elements: Vec<CriteriaElement>,
}

impl Criteria {
    /// Build criteria from an ordered element list
    ///
    /// Fails with a configuration error if the list is empty or any range
    /// strategy has a non-positive bin width.
    pub fn new(elements: Vec<CriteriaElement>) -> Result<Self> {
        if elements.is_empty() {
            return Err(Error::EmptyCriteria);
        }
        for element in &elements {
            element.strategy.validate()?;
        }
        Ok(Self { elements })
    }

    /// Convenience constructor for a single-level criteria
    pub fn single(field: impl Into<String>, strategy: Strategy) -> Result<Self> {
        Self::new(vec![CriteriaElement::new(field, strategy)])
    }

    /// The ordered levels
    pub fn elements(&self) -> &[CriteriaElement] {
        &self.elements
    }

    /// Number of classification levels
    pub fn depth(&self) -> usize {
        self.elements.len()
    }
}
