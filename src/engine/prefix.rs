//! Transient prefix index for the global engine.
//!
//! Maps each d-nucleotide prefix seen in one batch of vertices to the
//! head of an intrusive chain (index-linked through `next`) of the
//! vertices sharing that prefix. The map is cleared, never reallocated,
//! between batches; the chain array lives for the whole build.

use ahash::RandomState;
use std::collections::HashMap;
use std::ops::Range;

use crate::engine::NONE;
use crate::kmer::codec::KmerBits;

pub(crate) struct PrefixChains<B: KmerBits> {
    heads: HashMap<B, usize, RandomState>,
    next: Vec<usize>,
}

impl<B: KmerBits> PrefixChains<B> {
    /// Capacity is reserved once, sized for one batch at a moderate load
    /// factor.
    pub fn new(num_vertices: usize, batch_size: usize) -> Self {
        Self {
            heads: HashMap::with_capacity_and_hasher(
                batch_size * 100 / 77,
                RandomState::default(),
            ),
            next: vec![NONE; num_vertices],
        }
    }

    /// Re-index one batch: push every vertex in `range` that can still
    /// receive an incoming edge onto the head of its prefix's chain.
    pub fn rebuild(
        &mut self,
        range: Range<usize>,
        prefix_forbidden: &[bool],
        prefix_of: impl Fn(usize) -> B,
    ) {
        self.heads.clear();
        for i in range {
            if prefix_forbidden[i] {
                continue;
            }
            let old = self.heads.insert(prefix_of(i), i).unwrap_or(NONE);
            self.next[i] = old;
        }
    }

    /// Head of the chain for `prefix`, or [`NONE`].
    pub fn head(&self, prefix: B) -> usize {
        self.heads.get(&prefix).copied().unwrap_or(NONE)
    }

    pub fn next_of(&self, i: usize) -> usize {
        self.next[i]
    }

    /// Splice the chain so that `i` points at `j`.
    pub fn set_next(&mut self, i: usize, j: usize) {
        self.next[i] = j;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kmer::codec::{bit_prefix, encode};

    #[test]
    fn test_chains_are_lifo_per_prefix() {
        // Vertices 0..3 over k=3, prefixes of length 2: AC, AC, GG.
        let kmers: Vec<u64> = ["ACT", "ACG", "GGT"]
            .iter()
            .map(|s| encode(s).unwrap())
            .collect();
        let mut chains = PrefixChains::new(3, 3);
        chains.rebuild(0..3, &[false, false, false], |i| bit_prefix(kmers[i], 3, 2));

        let ac: u64 = encode("AC").unwrap();
        let gg: u64 = encode("GG").unwrap();
        let tt: u64 = encode("TT").unwrap();
        assert_eq!(chains.head(ac), 1);
        assert_eq!(chains.next_of(1), 0);
        assert_eq!(chains.next_of(0), NONE);
        assert_eq!(chains.head(gg), 2);
        assert_eq!(chains.head(tt), NONE);
    }

    #[test]
    fn test_rebuild_skips_forbidden_and_resets() {
        let kmers: Vec<u64> = ["ACT", "ACG"].iter().map(|s| encode(s).unwrap()).collect();
        let mut chains = PrefixChains::new(2, 2);
        chains.rebuild(0..2, &[false, false], |i| bit_prefix(kmers[i], 3, 2));
        chains.rebuild(0..2, &[false, true], |i| bit_prefix(kmers[i], 3, 2));

        let ac: u64 = encode("AC").unwrap();
        assert_eq!(chains.head(ac), 0);
        assert_eq!(chains.next_of(0), NONE);
    }

    #[test]
    fn test_splice() {
        let kmers: Vec<u64> = ["ACT", "ACG", "ACC"]
            .iter()
            .map(|s| encode(s).unwrap())
            .collect();
        let mut chains = PrefixChains::new(3, 3);
        chains.rebuild(0..3, &[false; 3], |i| bit_prefix(kmers[i], 3, 2));

        // Chain is 2 -> 1 -> 0; splice 1 out.
        chains.set_next(2, chains.next_of(1));
        assert_eq!(chains.next_of(2), 0);
    }
}
