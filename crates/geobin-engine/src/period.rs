//! Calendar and cyclic time bucketing
//!
//! Calendar units (hour, day, week, month, year) bucket by the truncated
//! period start; weeks start on Monday. Cyclic units (hour of day, day of
//! week, month of year) fold time onto a repeating axis, so every Monday
//! shares one bucket. Bins are created lazily, ordered ascending by key,
//! deleted when drained; nulls route to a reserved N/A bin sorted last.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};
use geobin_core::{PeriodUnit, Result};
use std::collections::BTreeMap;
use tracing::trace;

use crate::bin::{Bin, BinnerState, PeriodKey};

/// Extraction function handing the binner a timestamp (or null) per record
pub type TimestampExtractor<T> = Box<dyn Fn(&T) -> Result<Option<DateTime<Utc>>> + Send + Sync>;

/// Key of the period containing `ts` under `unit`
pub fn period_key(unit: PeriodUnit, ts: DateTime<Utc>) -> PeriodKey {
    let date = ts.date_naive();
    match unit {
        PeriodUnit::Hour => PeriodKey::Start(
            date.and_hms_opt(ts.hour(), 0, 0)
                .expect("in-range hour")
                .and_utc(),
        ),
        PeriodUnit::Day => PeriodKey::Start(date.and_hms_opt(0, 0, 0).expect("midnight").and_utc()),
        PeriodUnit::Week => {
            let monday = date - Duration::days(ts.weekday().num_days_from_monday() as i64);
            PeriodKey::Start(monday.and_hms_opt(0, 0, 0).expect("midnight").and_utc())
        }
        PeriodUnit::Month => PeriodKey::Start(
            NaiveDate::from_ymd_opt(ts.year(), ts.month(), 1)
                .expect("first of month")
                .and_hms_opt(0, 0, 0)
                .expect("midnight")
                .and_utc(),
        ),
        PeriodUnit::Year => PeriodKey::Start(
            NaiveDate::from_ymd_opt(ts.year(), 1, 1)
                .expect("first of year")
                .and_hms_opt(0, 0, 0)
                .expect("midnight")
                .and_utc(),
        ),
        PeriodUnit::HourOfDay => PeriodKey::Cycle(ts.hour()),
        PeriodUnit::DayOfWeek => PeriodKey::Cycle(ts.weekday().num_days_from_monday()),
        PeriodUnit::MonthOfYear => PeriodKey::Cycle(ts.month()),
    }
}

/// Single-level period binner (auto-growth only)
pub struct PeriodBinner<T> {
    unit: PeriodUnit,
    extract: TimestampExtractor<T>,
    bins: BTreeMap<PeriodKey, Bin<T>>,
    missing: Option<Bin<T>>,
}

impl<T> PeriodBinner<T> {
    /// Binner bucketing by the given calendar or cyclic unit
    pub fn new(
        unit: PeriodUnit,
        extract: impl Fn(&T) -> Result<Option<DateTime<Utc>>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            unit,
            extract: Box::new(extract),
            bins: BTreeMap::new(),
            missing: None,
        }
    }

    /// The unit this binner buckets by
    pub fn unit(&self) -> PeriodUnit {
        self.unit
    }

    /// Classify one record; `Ok(true)` when a new bin was created
    pub fn add(&mut self, item: T) -> Result<bool> {
        let ts = (self.extract)(&item)?;
        let (bin, created) = self.route(ts);
        bin.push(item);
        Ok(created)
    }

    /// Remove one record; `Ok(false)` when not present
    pub fn remove(&mut self, item: &T) -> Result<bool>
    where
        T: PartialEq,
    {
        let ts = (self.extract)(item)?;
        let removed = match self.locate(ts) {
            Some(bin) => bin.remove_member(item),
            None => false,
        };
        if removed {
            self.prune(ts);
        }
        Ok(removed)
    }

    /// Bins ascending by period key, with the N/A bin (if any) last
    pub fn bins(&self) -> Vec<&Bin<T>> {
        let mut out: Vec<&Bin<T>> = self.bins.values().collect();
        if let Some(bin) = &self.missing {
            out.push(bin);
        }
        out
    }

    /// Number of bins, N/A included
    pub fn bin_count(&self) -> usize {
        self.bins.len() + usize::from(self.missing.is_some())
    }

    /// Total members across all bins
    pub fn len(&self) -> usize {
        self.bins().iter().map(|bin| bin.len()).sum()
    }

    /// True when no members are held
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lifecycle state
    pub fn state(&self) -> BinnerState {
        if self.bins.is_empty() && self.missing.is_none() {
            BinnerState::Empty
        } else {
            BinnerState::Populated
        }
    }

    pub(crate) fn extract_value(&self, item: &T) -> Result<Option<DateTime<Utc>>> {
        (self.extract)(item)
    }

    /// Find or create the bin for a pre-extracted timestamp
    pub(crate) fn route(&mut self, ts: Option<DateTime<Utc>>) -> (&mut Bin<T>, bool) {
        let Some(ts) = ts else {
            let created = self.missing.is_none();
            if created {
                trace!("created N/A bin");
            }
            return (self.missing.get_or_insert_with(Bin::missing), created);
        };
        let key = period_key(self.unit, ts);
        let created = !self.bins.contains_key(&key);
        if created {
            trace!(?key, "created period bin");
        }
        (
            self.bins.entry(key).or_insert_with(|| Bin::period(key)),
            created,
        )
    }

    /// Find the bin for a pre-extracted timestamp without creating one
    pub(crate) fn locate(&mut self, ts: Option<DateTime<Utc>>) -> Option<&mut Bin<T>> {
        match ts {
            None => self.missing.as_mut(),
            Some(ts) => self.bins.get_mut(&period_key(self.unit, ts)),
        }
    }

    /// Drop the bin for `ts` if it drained
    pub(crate) fn prune(&mut self, ts: Option<DateTime<Utc>>) {
        match ts {
            None => {
                if self.missing.as_ref().is_some_and(|bin| bin.is_drained()) {
                    self.missing = None;
                }
            }
            Some(ts) => {
                let key = period_key(self.unit, ts);
                if self.bins.get(&key).is_some_and(|bin| bin.is_drained()) {
                    trace!(?key, "removed drained period bin");
                    self.bins.remove(&key);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 30, 0).unwrap()
    }

    fn day_binner() -> PeriodBinner<DateTime<Utc>> {
        PeriodBinner::new(PeriodUnit::Day, |t: &DateTime<Utc>| Ok(Some(*t)))
    }

    #[test]
    fn test_day_truncation() {
        let key = period_key(PeriodUnit::Day, ts(2024, 3, 15, 13));
        assert_eq!(
            key,
            PeriodKey::Start(Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_week_starts_monday() {
        // 2024-03-15 is a Friday; its week starts Monday 2024-03-11
        let key = period_key(PeriodUnit::Week, ts(2024, 3, 15, 13));
        assert_eq!(
            key,
            PeriodKey::Start(Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_calendar_bucketing() {
        let mut binner = day_binner();
        binner.add(ts(2024, 3, 15, 9)).unwrap();
        binner.add(ts(2024, 3, 15, 17)).unwrap();
        binner.add(ts(2024, 3, 16, 1)).unwrap();
        binner.add(ts(2024, 3, 14, 23)).unwrap();

        let bins = binner.bins();
        assert_eq!(bins.len(), 3);
        // Ascending by period start
        let counts: Vec<usize> = bins.iter().map(|bin| bin.len()).collect();
        assert_eq!(counts, vec![1, 2, 1]);
    }

    #[test]
    fn test_cyclic_bucketing_folds_weeks() {
        let mut binner =
            PeriodBinner::new(PeriodUnit::DayOfWeek, |t: &DateTime<Utc>| Ok(Some(*t)));
        // Two Fridays a week apart share one bucket
        binner.add(ts(2024, 3, 15, 9)).unwrap();
        binner.add(ts(2024, 3, 22, 9)).unwrap();
        // One Monday
        binner.add(ts(2024, 3, 18, 9)).unwrap();

        let bins = binner.bins();
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].key().to_string(), "0"); // Monday first
        assert_eq!(bins[1].len(), 2);
    }

    #[test]
    fn test_null_routes_to_missing_bin() {
        let mut binner = PeriodBinner::new(PeriodUnit::Month, |t: &Option<DateTime<Utc>>| Ok(*t));
        binner.add(Some(ts(2024, 3, 15, 9))).unwrap();
        binner.add(None).unwrap();

        let bins = binner.bins();
        assert_eq!(bins.len(), 2);
        assert!(bins[1].key().is_missing());

        assert!(binner.remove(&None).unwrap());
        assert_eq!(binner.bin_count(), 1);
    }

    #[test]
    fn test_drained_bins_deleted() {
        let mut binner = day_binner();
        let t = ts(2024, 3, 15, 9);
        binner.add(t).unwrap();
        assert_eq!(binner.state(), BinnerState::Populated);
        assert!(binner.remove(&t).unwrap());
        assert_eq!(binner.state(), BinnerState::Empty);
        assert_eq!(binner.bin_count(), 0);
    }
}
