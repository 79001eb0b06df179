//! Bin types: the buckets records are classified into
//!
//! A [`Bin`] is a named bucket with a stable id, a classification key, an
//! ordered member list, and — inside a hierarchy — at most one child binner
//! for the next criteria level. Ownership of children is strictly single and
//! acyclic: a bin owns its child binner, which owns its bins, and so on.

use chrono::{DateTime, Utc};
use geobin_core::Value;
use ordered_float::OrderedFloat;
use std::fmt;
use uuid::Uuid;

use crate::level::LevelBinner;

/// Stable, unique bin identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BinId(Uuid);

impl BinId {
    fn new() -> Self {
        BinId(Uuid::new_v4())
    }
}

impl fmt::Display for BinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Classification key of a period bin
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PeriodKey {
    /// Start of a calendar period (hour, day, week, month, year)
    Start(DateTime<Utc>),
    /// Index on a cyclic axis (hour of day, day of week, month of year)
    Cycle(u32),
}

/// Classification key of a bin
///
/// The variant order drives bin ordering: numeric intervals ascend by min,
/// period keys ascend by start/cycle index, and the reserved `Missing` (N/A)
/// key always sorts last.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BinKey {
    /// Half-open numeric interval `[min, max)`; canonical value is `min`
    Range {
        min: OrderedFloat<f64>,
        max: OrderedFloat<f64>,
    },
    /// Calendar or cyclic period
    Period(PeriodKey),
    /// Exact extracted key; `None` is a valid, distinct null key
    Unique(Option<Value>),
    /// Reserved N/A key collecting records whose field is null
    Missing,
}

impl BinKey {
    /// The bin's representative classification value
    ///
    /// Range interval's min, period start (or cycle index), or the exact
    /// unique key. `None` for null-keyed and N/A bins.
    pub fn canonical(&self) -> Option<Value> {
        match self {
            BinKey::Range { min, .. } => Some(Value::Float(*min)),
            BinKey::Period(PeriodKey::Start(ts)) => Some(Value::Timestamp(*ts)),
            BinKey::Period(PeriodKey::Cycle(idx)) => Some(Value::Int(*idx as i64)),
            BinKey::Unique(key) => key.clone(),
            BinKey::Missing => None,
        }
    }

    /// True for the reserved N/A key
    pub fn is_missing(&self) -> bool {
        matches!(self, BinKey::Missing)
    }

    /// True if this is a numeric interval containing `value`
    pub(crate) fn contains(&self, value: f64) -> bool {
        match self {
            BinKey::Range { min, max } => value >= min.into_inner() && value < max.into_inner(),
            _ => false,
        }
    }
}

impl fmt::Display for BinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinKey::Range { min, max } => write!(f, "[{min}, {max})"),
            BinKey::Period(PeriodKey::Start(ts)) => write!(f, "{}", ts.to_rfc3339()),
            BinKey::Period(PeriodKey::Cycle(idx)) => write!(f, "{idx}"),
            BinKey::Unique(Some(value)) => write!(f, "{value}"),
            BinKey::Unique(None) | BinKey::Missing => write!(f, "N/A"),
        }
    }
}

/// Lifecycle state of a binner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinnerState {
    /// No bins yet (auto-growth binners start here and return here when drained)
    Empty,
    /// At least one bin exists; pre-seeded binners never leave this state
    Populated,
}

/// A bucket holding records that share a classification
///
/// `size() == members().len()` at all times. In a hierarchy only leaf bins
/// hold members; non-leaf bins delegate storage to their child binner.
pub struct Bin<T> {
    id: BinId,
    key: BinKey,
    members: Vec<T>,
    child: Option<Box<LevelBinner<T>>>,
}

impl<T> Bin<T> {
    fn with_key(key: BinKey) -> Self {
        Self {
            id: BinId::new(),
            key,
            members: Vec::new(),
            child: None,
        }
    }

    /// Create an empty range bin covering `[min, max)`
    pub fn range(min: f64, max: f64) -> Self {
        Self::with_key(BinKey::Range {
            min: OrderedFloat(min),
            max: OrderedFloat(max),
        })
    }

    /// Create an empty unique-value bin for an exact key
    pub fn unique(key: Option<Value>) -> Self {
        Self::with_key(BinKey::Unique(key))
    }

    /// Create the reserved N/A bin
    pub fn missing() -> Self {
        Self::with_key(BinKey::Missing)
    }

    pub(crate) fn period(key: PeriodKey) -> Self {
        Self::with_key(BinKey::Period(key))
    }

    /// Stable unique identifier
    pub fn id(&self) -> BinId {
        self.id
    }

    /// Classification key
    pub fn key(&self) -> &BinKey {
        &self.key
    }

    /// Canonical classification value (see [`BinKey::canonical`])
    pub fn canonical(&self) -> Option<Value> {
        self.key.canonical()
    }

    /// Member records, in insertion order
    pub fn members(&self) -> &[T] {
        &self.members
    }

    /// Live member count
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True when the bin holds no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Interval bounds, for range bins
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match &self.key {
            BinKey::Range { min, max } => Some((min.into_inner(), max.into_inner())),
            _ => None,
        }
    }

    pub(crate) fn push(&mut self, item: T) {
        self.members.push(item);
    }

    pub(crate) fn remove_member(&mut self, item: &T) -> bool
    where
        T: PartialEq,
    {
        match self.members.iter().position(|m| m == item) {
            Some(pos) => {
                self.members.remove(pos);
                true
            }
            None => false,
        }
    }

    pub(crate) fn child(&self) -> Option<&LevelBinner<T>> {
        self.child.as_deref()
    }

    pub(crate) fn child_mut(&mut self) -> Option<&mut LevelBinner<T>> {
        self.child.as_deref_mut()
    }

    pub(crate) fn ensure_child_with(
        &mut self,
        make: impl FnOnce() -> geobin_core::Result<LevelBinner<T>>,
    ) -> geobin_core::Result<&mut LevelBinner<T>> {
        if self.child.is_none() {
            self.child = Some(Box::new(make()?));
        }
        Ok(self.child.as_mut().unwrap())
    }

    /// True when nothing lives in or below this bin
    pub(crate) fn is_drained(&self) -> bool {
        self.members.is_empty()
            && self
                .child
                .as_ref()
                .map_or(true, |child| child.bin_count() == 0)
    }
}

impl<T> fmt::Debug for Bin<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bin")
            .field("key", &self.key)
            .field("size", &self.members.len())
            .field("has_child", &self.child.is_some())
            .finish()
    }
}
