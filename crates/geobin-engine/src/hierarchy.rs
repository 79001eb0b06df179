//! Hierarchical orchestration of single-level binners
//!
//! Given an ordered criteria sequence, each record is classified through
//! level 0, then through a child binner owned by the level-0 bin it landed
//! in, and so on down to the last level, where it becomes a direct member of
//! a leaf bin. Only leaf bins are exposed to callers.
//!
//! The engine is synchronous and not internally locked: callers must
//! serialize mutation. The one safe concurrent-read surface is the
//! [`LiveCount`] handle, a relaxed atomic snapshot of the live record count
//! for a presentation layer to poll.

use geobin_core::{Criteria, CriteriaElement, Error, FieldAccessor, Result, Strategy, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::bin::{Bin, BinKey, BinnerState};
use crate::level::LevelBinner;
use crate::period::PeriodBinner;
use crate::range::RangeBinner;
use crate::unique::UniqueValueBinner;

/// Cloneable, lock-free view of the live record count
///
/// Safe to read from any thread while another thread mutates the binner;
/// reads are relaxed snapshots, not synchronization points.
#[derive(Clone, Debug)]
pub struct LiveCount(Arc<AtomicUsize>);

impl LiveCount {
    /// Current live record count
    pub fn get(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

/// Multi-level binner routing records through an ordered criteria sequence
pub struct HierarchicalBinner<T, A> {
    criteria: Criteria,
    accessor: Arc<A>,
    root: LevelBinner<T>,
    live: Arc<AtomicUsize>,
}

impl<T, A> HierarchicalBinner<T, A>
where
    T: PartialEq + 'static,
    A: FieldAccessor<T> + Send + Sync + 'static,
{
    /// Bind criteria to a field-value accessor
    ///
    /// The criteria are immutable from here on; changing them means building
    /// a new binner.
    pub fn new(criteria: Criteria, accessor: A) -> Result<Self> {
        let accessor = Arc::new(accessor);
        let root = build_level(&criteria.elements()[0], &accessor)?;
        debug!(depth = criteria.depth(), "constructed hierarchical binner");
        Ok(Self {
            criteria,
            accessor,
            root,
            live: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// The bound criteria
    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    /// Classify one record down to a leaf bin
    ///
    /// Returns `Ok(true)` when a new leaf bin was created. Fails atomically:
    /// every level's value is extracted and type-checked before any bin is
    /// touched, so a classification error leaves all state intact.
    pub fn add(&mut self, item: T) -> Result<bool> {
        self.check_classifiable(&item)?;
        let rest = &self.criteria.elements()[1..];
        let created = add_into(&mut self.root, rest, &self.accessor, item)?;
        self.live.fetch_add(1, Ordering::Relaxed);
        Ok(created)
    }

    /// Classify records one by one; stops at the first failing record
    pub fn add_all(&mut self, items: impl IntoIterator<Item = T>) -> Result<()> {
        for item in items {
            self.add(item)?;
        }
        Ok(())
    }

    /// Remove one record, pruning drained bins bottom-up
    ///
    /// Returns `Ok(false)` when the record is not present; no counts change.
    pub fn remove(&mut self, item: &T) -> Result<bool> {
        self.check_classifiable(item)?;
        let removed = remove_into(&mut self.root, item)?;
        if removed {
            self.live.fetch_sub(1, Ordering::Relaxed);
        }
        Ok(removed)
    }

    /// Remove records one by one; returns how many were actually present
    pub fn remove_all<'a>(&mut self, items: impl IntoIterator<Item = &'a T>) -> Result<usize>
    where
        T: 'a,
    {
        let mut removed = 0;
        for item in items {
            if self.remove(item)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Flattened leaf bins, in the order produced by the deepest binners
    pub fn bins(&self) -> Vec<&Bin<T>> {
        let mut out = Vec::new();
        collect_leaves(&self.root, self.criteria.depth() - 1, &mut out);
        out
    }

    /// Key -> leaf bin view; only defined for single-level criteria
    pub fn bins_map(&self) -> Result<BTreeMap<BinKey, &Bin<T>>> {
        if self.criteria.depth() != 1 {
            return Err(Error::invalid_state(
                "bins_map is only defined for single-level criteria",
            ));
        }
        Ok(self
            .root
            .bins()
            .into_iter()
            .map(|bin| (bin.key().clone(), bin))
            .collect())
    }

    /// Live record count: the sum of all leaf bin sizes
    pub fn len(&self) -> usize {
        self.live.load(Ordering::Relaxed)
    }

    /// True when no live records are held
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot count handle for lock-free polling by a presentation layer
    pub fn live_count(&self) -> LiveCount {
        LiveCount(Arc::clone(&self.live))
    }

    /// Lifecycle state of the root level
    pub fn state(&self) -> BinnerState {
        self.root.state()
    }

    /// Extract and type-check every level's value before mutating anything
    fn check_classifiable(&self, item: &T) -> Result<()> {
        for element in self.criteria.elements() {
            let value = self.accessor.value(element.field(), item)?;
            check_coercible(element, value.as_ref())?;
        }
        Ok(())
    }
}

/// Verify a value coerces to what the level's strategy needs
fn check_coercible(element: &CriteriaElement, value: Option<&Value>) -> Result<()> {
    let Some(value) = value else {
        // Null is a valid classification key at every level
        return Ok(());
    };
    match element.strategy() {
        Strategy::Range { .. } if value.as_f64().is_none() => Err(Error::classification(
            element.field(),
            format!("expected a numeric value, got {}", value.type_name()),
        )),
        Strategy::Period { .. } if value.as_timestamp().is_none() => Err(Error::classification(
            element.field(),
            format!("expected a timestamp, got {}", value.type_name()),
        )),
        _ => Ok(()),
    }
}

/// Build the single-level binner for one criteria element
///
/// The binner kind is matched once from the strategy tag; the extractor
/// closes over the shared accessor and the level's field name.
fn build_level<T, A>(element: &CriteriaElement, accessor: &Arc<A>) -> Result<LevelBinner<T>>
where
    T: 'static,
    A: FieldAccessor<T> + Send + Sync + 'static,
{
    let field = element.field().to_string();
    match element.strategy() {
        Strategy::Range { bin_width } => {
            let accessor = Arc::clone(accessor);
            let binner = RangeBinner::new(*bin_width, move |item: &T| {
                match accessor.value(&field, item)? {
                    None => Ok(None),
                    Some(value) => match value.as_f64() {
                        Some(v) => Ok(Some(v)),
                        None => Err(Error::classification(
                            &field,
                            format!("expected a numeric value, got {}", value.type_name()),
                        )),
                    },
                }
            })?;
            Ok(LevelBinner::Range(binner))
        }
        Strategy::Unique => {
            let accessor = Arc::clone(accessor);
            Ok(LevelBinner::Unique(UniqueValueBinner::new(
                move |item: &T| accessor.value(&field, item),
            )))
        }
        Strategy::Period { unit } => {
            let accessor = Arc::clone(accessor);
            Ok(LevelBinner::Period(PeriodBinner::new(
                *unit,
                move |item: &T| match accessor.value(&field, item)? {
                    None => Ok(None),
                    Some(value) => match value.as_timestamp() {
                        Some(ts) => Ok(Some(ts)),
                        None => Err(Error::classification(
                            &field,
                            format!("expected a timestamp, got {}", value.type_name()),
                        )),
                    },
                },
            )))
        }
    }
}

/// Route a record down the levels, creating bins and child binners on demand
fn add_into<T, A>(
    binner: &mut LevelBinner<T>,
    rest: &[CriteriaElement],
    accessor: &Arc<A>,
    item: T,
) -> Result<bool>
where
    T: PartialEq + 'static,
    A: FieldAccessor<T> + Send + Sync + 'static,
{
    // Hierarchy levels are always auto-growth, so routing always yields a bin
    let Some((bin, created)) = binner.route(&item)? else {
        return Ok(false);
    };
    match rest.split_first() {
        None => {
            bin.push(item);
            Ok(created)
        }
        Some((next, remaining)) => {
            let child = bin.ensure_child_with(|| build_level(next, accessor))?;
            add_into(child, remaining, accessor, item)
        }
    }
}

/// Remove a record from its leaf bin, pruning drained bins bottom-up
fn remove_into<T: PartialEq>(binner: &mut LevelBinner<T>, item: &T) -> Result<bool> {
    let removed = match binner.locate(item)? {
        None => false,
        Some(bin) => match bin.child_mut() {
            Some(child) => remove_into(child, item)?,
            None => bin.remove_member(item),
        },
    };
    if removed {
        binner.prune(item)?;
    }
    Ok(removed)
}

/// Depth-first walk collecting only the deepest-level bins
fn collect_leaves<'a, T>(binner: &'a LevelBinner<T>, remaining: usize, out: &mut Vec<&'a Bin<T>>) {
    for bin in binner.bins() {
        if remaining == 0 {
            out.push(bin);
        } else if let Some(child) = bin.child() {
            collect_leaves(child, remaining - 1, out);
        }
    }
}
