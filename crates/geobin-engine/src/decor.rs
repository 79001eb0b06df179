//! Presentation-layer decoration of bins
//!
//! A rendering layer wants to hang UI-only state (a color, an observable
//! count) off each leaf bin without that state leaking into the core. The
//! [`BinView`] trait is the read surface the core exposes; [`DecoratedBin`]
//! is a pure forwarding decorator adding the presentation fields beside it.

use geobin_core::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::bin::{Bin, BinId, BinKey};

/// Read-only classification view of a bin
pub trait BinView<T> {
    /// Stable unique identifier
    fn id(&self) -> BinId;
    /// Classification key
    fn key(&self) -> &BinKey;
    /// Canonical classification value
    fn canonical(&self) -> Option<Value>;
    /// Live member count
    fn len(&self) -> usize;
    /// True when the bin holds no members
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Member records
    fn members(&self) -> &[T];
}

impl<T> BinView<T> for Bin<T> {
    fn id(&self) -> BinId {
        Bin::id(self)
    }

    fn key(&self) -> &BinKey {
        Bin::key(self)
    }

    fn canonical(&self) -> Option<Value> {
        Bin::canonical(self)
    }

    fn len(&self) -> usize {
        Bin::len(self)
    }

    fn members(&self) -> &[T] {
        Bin::members(self)
    }
}

/// RGBA render color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Shared count cell a render loop can poll without locking
#[derive(Clone, Debug)]
pub struct ObservedCount(Arc<AtomicUsize>);

impl ObservedCount {
    fn new(count: usize) -> Self {
        Self(Arc::new(AtomicUsize::new(count)))
    }

    /// Last published count
    pub fn get(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }

    fn set(&self, count: usize) {
        self.0.store(count, Ordering::Relaxed);
    }
}

/// Forwarding decorator pairing a leaf bin with presentation-only state
pub struct DecoratedBin<'a, T> {
    bin: &'a Bin<T>,
    color: Color,
    observed: ObservedCount,
}

impl<'a, T> DecoratedBin<'a, T> {
    /// Decorate a bin with a render color
    pub fn new(bin: &'a Bin<T>, color: Color) -> Self {
        let observed = ObservedCount::new(bin.len());
        Self {
            bin,
            color,
            observed,
        }
    }

    /// Render color
    pub fn color(&self) -> Color {
        self.color
    }

    /// Replace the render color
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Handle a render loop keeps to poll the published count
    pub fn observed_count(&self) -> ObservedCount {
        self.observed.clone()
    }

    /// Publish the bin's current count to observers
    pub fn refresh(&self) {
        self.observed.set(self.bin.len());
    }
}

impl<T> BinView<T> for DecoratedBin<'_, T> {
    fn id(&self) -> BinId {
        self.bin.id()
    }

    fn key(&self) -> &BinKey {
        self.bin.key()
    }

    fn canonical(&self) -> Option<Value> {
        self.bin.canonical()
    }

    fn len(&self) -> usize {
        self.bin.len()
    }

    fn members(&self) -> &[T] {
        self.bin.members()
    }
}
