//! Hash set of packed k-mers with optional reverse-complement identity.
//!
//! With complements on, a k-mer and its reverse complement are the same
//! logical element: inserts store the canonical (numerically smaller)
//! form, and membership/erase accept either orientation.

use ahash::RandomState;
use std::collections::HashSet;

use crate::kmer::codec::{canonical, reverse_complement, KmerBits};

pub struct KmerSet<B: KmerBits> {
    k: usize,
    complements: bool,
    items: HashSet<B, RandomState>,
    /// Insertion order, replayed by the seed cursor. May contain entries
    /// that have since been erased; those are skipped on replay.
    seeds: Vec<B>,
    cursor: usize,
}

impl<B: KmerBits> KmerSet<B> {
    pub fn new(k: usize, complements: bool) -> Self {
        Self {
            k,
            complements,
            items: HashSet::default(),
            seeds: Vec::new(),
            cursor: 0,
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn complements(&self) -> bool {
        self.complements
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Insert a k-mer, canonicalizing first when complements are on.
    /// Returns whether the set changed.
    pub fn insert(&mut self, x: B) -> bool {
        let x = if self.complements {
            canonical(x, self.k)
        } else {
            x
        };
        let added = self.items.insert(x);
        if added {
            self.seeds.push(x);
        }
        added
    }

    /// Membership of the exact encoding.
    pub fn contains(&self, x: B) -> bool {
        self.items.contains(&x)
    }

    /// Membership of a k-mer in either orientation.
    pub fn contains_any_orientation(&self, x: B) -> bool {
        self.items.contains(&x)
            || (self.complements && self.items.contains(&reverse_complement(x, self.k)))
    }

    /// Remove the exact encoding. Returns whether it was present.
    pub fn erase(&mut self, x: B) -> bool {
        self.items.remove(&x)
    }

    /// Erase whichever of {x, rc(x)} is present. Returns whether one was.
    pub fn erase_any_orientation(&mut self, x: B) -> bool {
        if self.erase(x) {
            return true;
        }
        self.complements && self.erase(reverse_complement(x, self.k))
    }

    /// The next still-present k-mer in insertion order, advancing the
    /// internal cursor. Every recorded k-mer is visited at most once, so
    /// draining the whole set this way is linear overall.
    pub fn next_seed(&mut self) -> Option<B> {
        while self.cursor < self.seeds.len() {
            let x = self.seeds[self.cursor];
            self.cursor += 1;
            if self.items.contains(&x) {
                return Some(x);
            }
        }
        None
    }

    pub fn iter(&self) -> impl Iterator<Item = &B> {
        self.items.iter()
    }

    /// Consume the set into a plain vector of its k-mers.
    pub fn into_kmer_vec(self) -> Vec<B> {
        self.items.into_iter().collect()
    }
}
