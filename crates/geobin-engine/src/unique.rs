//! Exact-key bucketing
//!
//! Every distinct extracted value gets its own bin; null is a valid, distinct
//! key. Key equality is value equality — two separately constructed equal
//! values land in the same bucket. Bins keep insertion order.

use geobin_core::{Result, Value};
use std::collections::HashMap;
use tracing::trace;

use crate::bin::{Bin, BinKey, BinnerState};

/// Extraction function handing the binner an exact key (or null) per record
pub type ValueExtractor<T> = Box<dyn Fn(&T) -> Result<Option<Value>> + Send + Sync>;

/// Single-level exact-value binner
pub struct UniqueValueBinner<T> {
    extract: ValueExtractor<T>,
    /// Bins in insertion order
    bins: Vec<Bin<T>>,
    /// Key -> position in `bins`
    index: HashMap<Option<Value>, usize>,
    custom: bool,
}

impl<T> UniqueValueBinner<T> {
    /// Auto-growth binner: a bin per distinct key, created lazily
    pub fn new(extract: impl Fn(&T) -> Result<Option<Value>> + Send + Sync + 'static) -> Self {
        Self {
            extract: Box::new(extract),
            bins: Vec::new(),
            index: HashMap::new(),
            custom: false,
        }
    }

    /// Custom binner over a fixed bin set; bins are never created or deleted
    ///
    /// Records whose key matches no supplied bin are left unclassified.
    pub fn from_bins(
        bins: Vec<Bin<T>>,
        extract: impl Fn(&T) -> Result<Option<Value>> + Send + Sync + 'static,
    ) -> Self {
        let mut index = HashMap::with_capacity(bins.len());
        for (pos, bin) in bins.iter().enumerate() {
            index.insert(unique_key_of(bin), pos);
        }
        Self {
            extract: Box::new(extract),
            bins,
            index,
            custom: true,
        }
    }

    /// Classify one record into the bin for its exact key
    ///
    /// Returns `Ok(true)` when a new bin was created.
    pub fn add(&mut self, item: T) -> Result<bool> {
        let key = (self.extract)(&item)?;
        match self.route(key) {
            Some((bin, created)) => {
                bin.push(item);
                Ok(created)
            }
            None => {
                trace!("key outside custom bin set, record left unclassified");
                Ok(false)
            }
        }
    }

    /// Remove one record; `Ok(false)` when not present
    pub fn remove(&mut self, item: &T) -> Result<bool>
    where
        T: PartialEq,
    {
        let key = (self.extract)(item)?;
        let removed = match self.locate(&key) {
            Some(bin) => bin.remove_member(item),
            None => false,
        };
        if removed {
            self.prune(&key);
        }
        Ok(removed)
    }

    /// Bins in insertion order
    pub fn bins(&self) -> Vec<&Bin<T>> {
        self.bins.iter().collect()
    }

    /// Key -> bin view
    pub fn bins_map(&self) -> HashMap<Option<Value>, &Bin<T>> {
        self.bins
            .iter()
            .map(|bin| (unique_key_of(bin), bin))
            .collect()
    }

    /// Number of bins
    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }

    /// Total members across all bins
    pub fn len(&self) -> usize {
        self.bins.iter().map(|bin| bin.len()).sum()
    }

    /// True when no members are held
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lifecycle state; custom binners never leave `Populated`
    pub fn state(&self) -> BinnerState {
        if self.custom || !self.bins.is_empty() {
            BinnerState::Populated
        } else {
            BinnerState::Empty
        }
    }

    pub(crate) fn extract_value(&self, item: &T) -> Result<Option<Value>> {
        (self.extract)(item)
    }

    /// Find or create the bin for a pre-extracted key
    pub(crate) fn route(&mut self, key: Option<Value>) -> Option<(&mut Bin<T>, bool)> {
        if let Some(&pos) = self.index.get(&key) {
            return Some((&mut self.bins[pos], false));
        }
        if self.custom {
            return None;
        }
        trace!(?key, "created unique-value bin");
        self.bins.push(Bin::unique(key.clone()));
        let pos = self.bins.len() - 1;
        self.index.insert(key, pos);
        Some((&mut self.bins[pos], true))
    }

    /// Find the bin for a pre-extracted key without creating one
    pub(crate) fn locate(&mut self, key: &Option<Value>) -> Option<&mut Bin<T>> {
        let pos = *self.index.get(key)?;
        Some(&mut self.bins[pos])
    }

    /// Drop the bin for `key` if it drained; custom bins are never dropped
    pub(crate) fn prune(&mut self, key: &Option<Value>) {
        if self.custom {
            return;
        }
        let Some(&pos) = self.index.get(key) else {
            return;
        };
        if !self.bins[pos].is_drained() {
            return;
        }
        trace!(key = %self.bins[pos].key(), "removed drained unique-value bin");
        self.bins.remove(pos);
        self.index.remove(key);
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
    }
}

/// Exact key a bin answers to within a unique-value binner
fn unique_key_of<T>(bin: &Bin<T>) -> Option<Value> {
    match bin.key() {
        BinKey::Unique(key) => key.clone(),
        BinKey::Missing => None,
        other => other.canonical(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_binner() -> UniqueValueBinner<String> {
        UniqueValueBinner::new(|s: &String| Ok(Some(Value::text(s.clone()))))
    }

    #[test]
    fn test_stringified_values_are_distinct_keys() {
        let mut binner = string_binner();
        binner.add("0.0".to_string()).unwrap();
        binner.add("10.0".to_string()).unwrap();
        assert_eq!(binner.bin_count(), 2);
    }

    #[test]
    fn test_equal_values_merge_into_one_bucket() {
        // Two separately constructed, numerically equal floats share a bucket
        let mut binner = UniqueValueBinner::new(|v: &f64| Ok(Some(Value::float(*v))));
        binner.add(0.0f64).unwrap();
        binner.add(0.0f64).unwrap();
        assert_eq!(binner.bin_count(), 1);
        assert_eq!(binner.bins()[0].len(), 2);
    }

    #[test]
    fn test_null_is_a_distinct_key() {
        let mut binner = UniqueValueBinner::new(|v: &Option<i64>| Ok(v.map(Value::Int)));
        binner.add(Some(1)).unwrap();
        binner.add(None).unwrap();
        binner.add(None).unwrap();
        assert_eq!(binner.bin_count(), 2);

        let map = binner.bins_map();
        assert_eq!(map[&None].len(), 2);
        assert_eq!(map[&Some(Value::Int(1))].len(), 1);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut binner = string_binner();
        for color in ["red", "blue", "red", "green"] {
            binner.add(color.to_string()).unwrap();
        }
        let keys: Vec<String> = binner.bins().iter().map(|b| b.key().to_string()).collect();
        assert_eq!(keys, vec!["red", "blue", "green"]);
    }

    #[test]
    fn test_auto_mode_deletes_drained_bins() {
        let mut binner = string_binner();
        binner.add("red".to_string()).unwrap();
        binner.add("blue".to_string()).unwrap();
        binner.add("blue".to_string()).unwrap();

        assert!(binner.remove(&"red".to_string()).unwrap());
        assert_eq!(binner.bin_count(), 1);
        // Index stays consistent after the shift
        assert!(binner.remove(&"blue".to_string()).unwrap());
        assert_eq!(binner.bins()[0].len(), 1);
        assert!(binner.remove(&"blue".to_string()).unwrap());
        assert_eq!(binner.state(), BinnerState::Empty);
    }

    #[test]
    fn test_custom_mode_never_deletes() {
        let seeded = vec![
            Bin::unique(Some(Value::text("red"))),
            Bin::unique(Some(Value::text("blue"))),
        ];
        let mut binner =
            UniqueValueBinner::from_bins(seeded, |s: &String| Ok(Some(Value::text(s.clone()))));

        assert!(!binner.add("red".to_string()).unwrap());
        // Unknown key never grows the bin set
        assert!(!binner.add("green".to_string()).unwrap());
        assert_eq!(binner.bin_count(), 2);

        assert!(binner.remove(&"red".to_string()).unwrap());
        assert_eq!(binner.bin_count(), 2);
        assert_eq!(binner.state(), BinnerState::Populated);
    }

    #[test]
    fn test_idempotent_removal() {
        let mut binner = string_binner();
        binner.add("red".to_string()).unwrap();
        assert!(!binner.remove(&"green".to_string()).unwrap());
        assert_eq!(binner.len(), 1);
    }
}
