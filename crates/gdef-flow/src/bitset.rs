//! A small fixed-capacity bitset used as the flow value of the analyses.

use alloc::{vec, vec::Vec};
use core::fmt;

/// A set of indices drawn from `0..capacity`.
///
/// Set operations return new values; a flow value handed to the engine is
/// never updated in place by another node's evaluation.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BitSet {
    bits: Vec<u64>,
    capacity: usize,
}

impl BitSet {
    /// The empty set over `0..capacity`.
    #[must_use]
    pub fn new_empty(capacity: usize) -> Self {
        let words = capacity.div_ceil(64);
        Self {
            bits: vec![0; words],
            capacity,
        }
    }

    /// The set containing every index in `0..capacity`.
    #[must_use]
    pub fn new_full(capacity: usize) -> Self {
        let mut s = Self::new_empty(capacity);
        for w in &mut s.bits {
            *w = !0;
        }
        // Clear unused bits in last word.
        let rem = capacity % 64;
        if rem != 0 {
            let mask = (1_u64 << rem) - 1;
            if let Some(last) = s.bits.last_mut() {
                *last &= mask;
            }
        }
        s
    }

    /// Size of the universe this set draws from.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn contains(&self, idx: usize) -> bool {
        if idx >= self.capacity {
            return false;
        }
        (self.bits[idx / 64] >> (idx % 64)) & 1 == 1
    }

    /// Add `idx`; indices outside the universe are ignored.
    pub fn insert(&mut self, idx: usize) {
        if idx >= self.capacity {
            return;
        }
        self.bits[idx / 64] |= 1_u64 << (idx % 64);
    }

    pub fn remove(&mut self, idx: usize) {
        if idx >= self.capacity {
            return;
        }
        self.bits[idx / 64] &= !(1_u64 << (idx % 64));
    }

    /// Elements present in both sets.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a & b)
    }

    /// Elements present in either set.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a | b)
    }

    /// Elements of `self` not in `other`.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a & !b)
    }

    /// A copy of this set with `idx` added.
    #[must_use]
    pub fn with(&self, idx: usize) -> Self {
        let mut s = self.clone();
        s.insert(idx);
        s
    }

    /// Whether every element of `self` is also in `other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        self.bits.iter().enumerate().all(|(i, &a)| {
            let b = other.bits.get(i).copied().unwrap_or(0);
            a & !b == 0
        })
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&w| w == 0)
    }

    /// Elements in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter().enumerate().flat_map(|(word_idx, &word)| {
            let mut word = word;
            core::iter::from_fn(move || {
                if word == 0 {
                    return None;
                }
                let bit = word.trailing_zeros() as usize;
                word &= word - 1;
                Some(word_idx * 64 + bit)
            })
        })
    }

    /// Combine word by word. The result spans the larger of the two
    /// universes; words missing from the smaller set read as zero.
    fn zip_with(&self, other: &Self, op: impl Fn(u64, u64) -> u64) -> Self {
        let words = self.bits.len().max(other.bits.len());
        let bits = (0..words)
            .map(|i| {
                let a = self.bits.get(i).copied().unwrap_or(0);
                let b = other.bits.get(i).copied().unwrap_or(0);
                op(a, b)
            })
            .collect();
        let mut s = Self {
            bits,
            capacity: self.capacity.max(other.capacity),
        };
        let rem = s.capacity % 64;
        if rem != 0 {
            if let Some(last) = s.bits.last_mut() {
                *last &= (1_u64 << rem) - 1;
            }
        }
        s
    }
}

impl FromIterator<usize> for BitSet {
    /// Collect indices into a set just large enough to hold the largest one.
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let items: Vec<usize> = iter.into_iter().collect();
        let capacity = items.iter().max().map_or(0, |&max| max + 1);
        let mut s = Self::new_empty(capacity);
        for idx in items {
            s.insert(idx);
        }
        s
    }
}

impl fmt::Debug for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
