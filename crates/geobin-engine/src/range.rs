//! Numeric bucketing into fixed-width intervals
//!
//! Intervals are half-open `[min, min + width)` with `min` floor-aligned to
//! an implicit zero origin (`min = floor(v / width) * width`). Two modes:
//!
//! - **auto-growth**: bins are created lazily as values arrive, and deleted
//!   when drained (unless empty-bin retention is on).
//! - **custom**: a fixed, caller-authoritative bin set supplied up front;
//!   bins are never created, merged, split or deleted.
//!
//! Null values route to a single reserved N/A bin, always sorted last.

use geobin_core::{Error, Result};
use std::collections::BTreeMap;
use tracing::trace;

use crate::bin::{Bin, BinnerState};

/// Extraction function handing the binner a numeric value (or null) per record
pub type NumberExtractor<T> = Box<dyn Fn(&T) -> Result<Option<f64>> + Send + Sync>;

// Tolerance for values sitting on an interval boundary up to binary-float
// division error, so 0.3 at width 0.1 lands in [0.3, 0.4) rather than [0.2, 0.3).
const BOUNDARY_EPSILON: f64 = 1e-9;

/// Index of the interval containing `value`, with boundary snapping
fn interval_index(value: f64, width: f64) -> i64 {
    let ratio = value / width;
    let nearest = ratio.round();
    if (ratio - nearest).abs() < BOUNDARY_EPSILON {
        nearest as i64
    } else {
        ratio.floor() as i64
    }
}

enum Store<T> {
    Auto {
        width: f64,
        bins: BTreeMap<i64, Bin<T>>,
        keep_empty: bool,
    },
    Custom {
        bins: Vec<Bin<T>>,
    },
}

/// Single-level numeric range binner
pub struct RangeBinner<T> {
    extract: NumberExtractor<T>,
    store: Store<T>,
    missing: Option<Bin<T>>,
}

impl<T> RangeBinner<T> {
    /// Auto-growth binner: bins of width `bin_width` created lazily
    ///
    /// Fails fast when `bin_width` is non-positive or non-finite.
    pub fn new(
        bin_width: f64,
        extract: impl Fn(&T) -> Result<Option<f64>> + Send + Sync + 'static,
    ) -> Result<Self> {
        Error::check_bin_width(bin_width)?;
        Ok(Self {
            extract: Box::new(extract),
            store: Store::Auto {
                width: bin_width,
                bins: BTreeMap::new(),
                keep_empty: false,
            },
            missing: None,
        })
    }

    /// Enable empty-bin synthesis: the numeric run stays contiguous from the
    /// lowest to the highest min seen, and drained bins are retained
    pub fn with_empty_bins(mut self) -> Self {
        if let Store::Auto { keep_empty, .. } = &mut self.store {
            *keep_empty = true;
        }
        self
    }

    /// Custom binner over a fixed, caller-authoritative bin set
    ///
    /// Supplied ranges are never merged, split or deleted. A value matching
    /// no bin is left unclassified. Nulls are only captured if the supplied
    /// set includes an N/A bin ([`Bin::missing`]).
    pub fn from_bins(
        bins: Vec<Bin<T>>,
        extract: impl Fn(&T) -> Result<Option<f64>> + Send + Sync + 'static,
    ) -> Self {
        let mut missing = None;
        let mut fixed = Vec::with_capacity(bins.len());
        for bin in bins {
            if bin.key().is_missing() {
                missing = Some(bin);
            } else {
                fixed.push(bin);
            }
        }
        fixed.sort_by(|a, b| a.key().cmp(b.key()));
        Self {
            extract: Box::new(extract),
            store: Store::Custom { bins: fixed },
            missing,
        }
    }

    /// Classify one record into its bin
    ///
    /// Returns `Ok(true)` when a new bin was created, `Ok(false)` when the
    /// record joined an existing bin — both are successful adds; the flag
    /// signals structural change.
    pub fn add(&mut self, item: T) -> Result<bool> {
        let value = (self.extract)(&item)?;
        match self.route(value) {
            Some((bin, created)) => {
                bin.push(item);
                Ok(created)
            }
            None => {
                trace!("value outside custom bin set, record left unclassified");
                Ok(false)
            }
        }
    }

    /// Remove one record from its bin
    ///
    /// Returns `Ok(false)` when the record is not present; no counts change.
    pub fn remove(&mut self, item: &T) -> Result<bool>
    where
        T: PartialEq,
    {
        let value = (self.extract)(item)?;
        let removed = match self.locate(value) {
            Some(bin) => bin.remove_member(item),
            None => false,
        };
        if removed {
            self.prune(value);
        }
        Ok(removed)
    }

    /// The `(min, max, canonical)` triple of the interval containing `value`
    ///
    /// `min = floor(value / width) * width`, `max = min + width`, canonical
    /// value equals `min`. Not defined for custom binners, whose bounds are
    /// caller-supplied.
    pub fn bounds_for(&self, value: f64) -> Result<(f64, f64, f64)> {
        match &self.store {
            Store::Auto { width, .. } => {
                let min = interval_index(value, *width) as f64 * *width;
                Ok((min, min + *width, min))
            }
            Store::Custom { .. } => Err(Error::invalid_state(
                "interval bounds are caller-supplied for pre-seeded bins",
            )),
        }
    }

    /// Bins in ascending order by min, with the N/A bin (if any) last
    pub fn bins(&self) -> Vec<&Bin<T>> {
        let mut out: Vec<&Bin<T>> = match &self.store {
            Store::Auto { bins, .. } => bins.values().collect(),
            Store::Custom { bins } => bins.iter().collect(),
        };
        if let Some(bin) = &self.missing {
            out.push(bin);
        }
        out
    }

    /// Number of bins, N/A included
    pub fn bin_count(&self) -> usize {
        let base = match &self.store {
            Store::Auto { bins, .. } => bins.len(),
            Store::Custom { bins } => bins.len(),
        };
        base + usize::from(self.missing.is_some())
    }

    /// Total members across all bins
    pub fn len(&self) -> usize {
        self.bins().iter().map(|bin| bin.len()).sum()
    }

    /// True when no members are held
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lifecycle state; custom binners never leave `Populated`
    pub fn state(&self) -> BinnerState {
        match &self.store {
            Store::Custom { .. } => BinnerState::Populated,
            Store::Auto { bins, .. } => {
                if bins.is_empty() && self.missing.is_none() {
                    BinnerState::Empty
                } else {
                    BinnerState::Populated
                }
            }
        }
    }

    pub(crate) fn extract_value(&self, item: &T) -> Result<Option<f64>> {
        (self.extract)(item)
    }

    /// Find or create the bin for a pre-extracted value
    pub(crate) fn route(&mut self, value: Option<f64>) -> Option<(&mut Bin<T>, bool)> {
        let Some(v) = value else {
            return self.route_missing();
        };
        match &mut self.store {
            Store::Auto {
                width,
                bins,
                keep_empty,
            } => {
                let idx = interval_index(v, *width);
                let created = !bins.contains_key(&idx);
                if created {
                    let min = idx as f64 * *width;
                    trace!(min, width = *width, "created range bin");
                    bins.insert(idx, Bin::range(min, min + *width));
                    if *keep_empty {
                        fill_gaps(bins, *width);
                    }
                }
                bins.get_mut(&idx).map(|bin| (bin, created))
            }
            Store::Custom { bins } => bins
                .iter_mut()
                .find(|bin| bin.key().contains(v))
                .map(|bin| (bin, false)),
        }
    }

    fn route_missing(&mut self) -> Option<(&mut Bin<T>, bool)> {
        if matches!(self.store, Store::Auto { .. }) && self.missing.is_none() {
            trace!("created N/A bin");
            self.missing = Some(Bin::missing());
            return self.missing.as_mut().map(|bin| (bin, true));
        }
        self.missing.as_mut().map(|bin| (bin, false))
    }

    /// Find the bin for a pre-extracted value without creating one
    pub(crate) fn locate(&mut self, value: Option<f64>) -> Option<&mut Bin<T>> {
        match value {
            None => self.missing.as_mut(),
            Some(v) => match &mut self.store {
                Store::Auto { width, bins, .. } => bins.get_mut(&interval_index(v, *width)),
                Store::Custom { bins } => bins.iter_mut().find(|bin| bin.key().contains(v)),
            },
        }
    }

    /// Drop the bin for `value` if it drained, per this binner's policy
    pub(crate) fn prune(&mut self, value: Option<f64>) {
        match value {
            None => {
                let drained = self.missing.as_ref().is_some_and(|bin| bin.is_drained());
                if drained && matches!(self.store, Store::Auto { .. }) {
                    trace!("removed drained N/A bin");
                    self.missing = None;
                }
            }
            Some(v) => {
                if let Store::Auto {
                    width,
                    bins,
                    keep_empty,
                } = &mut self.store
                {
                    if *keep_empty {
                        return;
                    }
                    let idx = interval_index(v, *width);
                    if bins.get(&idx).is_some_and(|bin| bin.is_drained()) {
                        trace!(min = idx as f64 * *width, "removed drained range bin");
                        bins.remove(&idx);
                    }
                }
            }
        }
    }
}

/// Synthesize every intermediate empty bin so the run stays contiguous
fn fill_gaps<T>(bins: &mut BTreeMap<i64, Bin<T>>, width: f64) {
    let (Some(&lo), Some(&hi)) = (bins.keys().next(), bins.keys().next_back()) else {
        return;
    };
    for idx in lo..=hi {
        bins.entry(idx).or_insert_with(|| {
            let min = idx as f64 * width;
            Bin::range(min, min + width)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn numeric_binner(width: f64) -> RangeBinner<f64> {
        RangeBinner::new(width, |v: &f64| Ok(Some(*v))).unwrap()
    }

    fn mins(binner: &RangeBinner<f64>) -> Vec<f64> {
        binner
            .bins()
            .iter()
            .filter_map(|bin| bin.bounds().map(|(min, _)| min))
            .collect()
    }

    #[test]
    fn test_invalid_width_rejected() {
        assert!(RangeBinner::new(0.0, |v: &f64| Ok(Some(*v))).is_err());
        assert!(RangeBinner::new(-1.0, |v: &f64| Ok(Some(*v))).is_err());
    }

    #[test]
    fn test_range_correctness_width_ten() {
        let mut binner = numeric_binner(10.0);
        assert!(binner.add(0.0).unwrap()); // creates [0, 10)
        assert!(!binner.add(3.5).unwrap()); // joins [0, 10)
        assert!(binner.add(10.0).unwrap()); // creates [10, 20)
        assert!(binner.add(33.0).unwrap()); // creates [30, 40)
        assert!(!binner.add(34.0).unwrap()); // joins [30, 40)

        let bins = binner.bins();
        assert_eq!(bins.len(), 3);
        assert_eq!(bins[0].bounds(), Some((0.0, 10.0)));
        assert_eq!(bins[0].len(), 2);
        assert_eq!(bins[1].bounds(), Some((10.0, 20.0)));
        assert_eq!(bins[1].len(), 1);
        assert_eq!(bins[2].bounds(), Some((30.0, 40.0)));
        assert_eq!(bins[2].len(), 2);

        assert!(binner.remove(&34.0).unwrap());
        let bins = binner.bins();
        assert_eq!(bins[2].len(), 1);
        assert_eq!(bins[2].members(), &[33.0]);
    }

    #[test]
    fn test_bounds_for_fractional_width() {
        let binner = numeric_binner(0.1);

        let (min, max, canonical) = binner.bounds_for(0.0).unwrap();
        assert_relative_eq!(min, 0.0);
        assert_relative_eq!(max, 0.1);
        assert_relative_eq!(canonical, 0.0);

        let (min, max, canonical) = binner.bounds_for(0.01).unwrap();
        assert_relative_eq!(min, 0.0);
        assert_relative_eq!(max, 0.1);
        assert_relative_eq!(canonical, 0.0);

        // 0.3 / 0.1 rounds below 3.0 in binary floats; boundary snapping
        // must still land it in [0.3, 0.4)
        let (min, max, canonical) = binner.bounds_for(0.3).unwrap();
        assert_relative_eq!(min, 0.3, epsilon = 1e-12);
        assert_relative_eq!(max, 0.4, epsilon = 1e-12);
        assert_relative_eq!(canonical, 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_bin_synthesis() {
        let mut binner = numeric_binner(10.0).with_empty_bins();
        binner.add(35.0).unwrap();
        binner.add(65.0).unwrap();
        assert_eq!(mins(&binner), vec![30.0, 40.0, 50.0, 60.0]);

        // Contiguity extends downward as a new extreme arrives
        binner.add(15.0).unwrap();
        assert_eq!(mins(&binner), vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0]);

        let counts: Vec<usize> = binner.bins().iter().map(|bin| bin.len()).collect();
        assert_eq!(counts, vec![1, 0, 1, 0, 0, 1]);
    }

    #[test]
    fn test_missing_bin_after_numeric_run() {
        let mut binner = RangeBinner::new(10.0, |v: &Option<f64>| Ok(*v))
            .unwrap()
            .with_empty_bins();
        binner.add(Some(35.0)).unwrap();
        binner.add(Some(65.0)).unwrap();
        binner.add(None).unwrap();
        binner.add(None).unwrap();

        let bins = binner.bins();
        assert_eq!(bins.len(), 5); // 4 contiguous + exactly one N/A
        assert!(bins[4].key().is_missing());
        assert_eq!(bins[4].len(), 2);
        // N/A stays last regardless of numeric extremes
        binner.add(Some(105.0)).unwrap();
        assert!(binner.bins().last().unwrap().key().is_missing());
    }

    #[test]
    fn test_remove_deletes_drained_bins_in_auto_mode() {
        let mut binner = numeric_binner(10.0);
        binner.add(5.0).unwrap();
        binner.add(6.0).unwrap();
        assert_eq!(binner.bin_count(), 1);
        assert!(binner.remove(&5.0).unwrap());
        assert_eq!(binner.bin_count(), 1);
        assert!(binner.remove(&6.0).unwrap());
        assert_eq!(binner.bin_count(), 0);
        assert_eq!(binner.state(), BinnerState::Empty);
    }

    #[test]
    fn test_remove_retains_bins_with_empty_retention() {
        let mut binner = numeric_binner(10.0).with_empty_bins();
        binner.add(5.0).unwrap();
        binner.add(25.0).unwrap();
        assert_eq!(binner.bin_count(), 3);
        assert!(binner.remove(&25.0).unwrap());
        // Contiguity preserved: drained bins stay
        assert_eq!(binner.bin_count(), 3);
        assert_eq!(binner.state(), BinnerState::Populated);
    }

    #[test]
    fn test_idempotent_removal() {
        let mut binner = numeric_binner(10.0);
        binner.add(5.0).unwrap();
        assert!(!binner.remove(&99.0).unwrap());
        assert!(binner.remove(&5.0).unwrap());
        assert!(!binner.remove(&5.0).unwrap());
    }

    #[test]
    fn test_custom_mode_is_fixed() {
        let seeded = vec![Bin::range(0.0, 10.0), Bin::range(10.0, 20.0), Bin::missing()];
        let mut binner = RangeBinner::from_bins(seeded, |v: &Option<f64>| Ok(*v));

        assert!(!binner.add(Some(5.0)).unwrap());
        assert!(!binner.add(None).unwrap());
        // Out-of-range value never grows the bin set
        assert!(!binner.add(Some(55.0)).unwrap());
        assert_eq!(binner.bin_count(), 3);
        assert_eq!(binner.len(), 2);

        // Draining never deletes custom bins
        assert!(binner.remove(&Some(5.0)).unwrap());
        assert!(binner.remove(&None).unwrap());
        assert_eq!(binner.bin_count(), 3);
        assert_eq!(binner.state(), BinnerState::Populated);

        assert!(binner.bounds_for(5.0).is_err());
    }

    #[test]
    fn test_negative_values_floor_align() {
        let mut binner = numeric_binner(10.0);
        binner.add(-3.0).unwrap();
        let bins = binner.bins();
        assert_eq!(bins[0].bounds(), Some((-10.0, 0.0)));
    }
}
