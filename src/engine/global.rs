//! Global engine: greedy approximation of the shortest superstring.
//!
//! Chains k-mers by longest suffix-to-prefix overlap, trying overlap
//! lengths from k-1 down to 0. For each length the candidate targets are
//! indexed by prefix in batches ([`MEMORY_REDUCTION_FACTOR`] of them) to
//! bound the peak size of the prefix map; the cost is one extra pass over
//! the vertices per batch.
//!
//! With complements on, vertex i in [n, 2n) stands for the reverse
//! complement of stored k-mer i - n, and every committed edge is mirrored
//! on the opposite strand, so the result is two paths that are reverse
//! complements of one another.

use std::ops::Range;

use crate::engine::prefix::PrefixChains;
use crate::engine::{vertex_kmer, NONE};
use crate::kmer::codec::{bit_prefix, bit_suffix, KmerBits};

/// Default number of batches per overlap length.
pub const MEMORY_REDUCTION_FACTOR: usize = 16;

/// The approximate Hamiltonian path: `edge_from[i]` is the successor of
/// vertex i (or [`NONE`]) and `overlaps[i]` the overlap length of that
/// edge.
pub struct OverlapPath {
    pub edge_from: Vec<usize>,
    pub overlaps: Vec<u8>,
}

/// Greedily build the overlap path over `kmers` (canonical encodings when
/// `complements` is on). `batches` trades speed for peak memory; 1 means
/// a single full-width prefix map per overlap length.
///
/// The input must be non-empty; the driver rejects empty sets before
/// calling in.
pub fn overlap_hamiltonian_path<B: KmerBits>(
    kmers: &[B],
    k: usize,
    complements: bool,
    batches: usize,
) -> OverlapPath {
    debug_assert!(!kmers.is_empty());
    PathBuilder::new(kmers, k, complements, batches.max(1)).build()
}

struct PathBuilder<'a, B: KmerBits> {
    kmers: &'a [B],
    k: usize,
    /// Number of stored k-mers.
    n: usize,
    /// Number of vertices: n, or 2n with complements.
    m: usize,
    complements: bool,
    batch_size: usize,
    edge_from: Vec<usize>,
    overlaps: Vec<u8>,
    /// Vertex already has an outgoing edge.
    suffix_forbidden: Vec<bool>,
    /// Vertex already has an incoming edge.
    prefix_forbidden: Vec<bool>,
    /// Head of the path fragment currently containing the vertex.
    first: Vec<usize>,
    /// Tail of the path fragment currently containing the vertex.
    last: Vec<usize>,
    chains: PrefixChains<B>,
}

impl<'a, B: KmerBits> PathBuilder<'a, B> {
    fn new(kmers: &'a [B], k: usize, complements: bool, batches: usize) -> Self {
        let n = kmers.len();
        let m = n * (1 + complements as usize);
        let batch_size = m / batches + 1;
        Self {
            kmers,
            k,
            n,
            m,
            complements,
            batch_size,
            edge_from: vec![NONE; m],
            overlaps: vec![0; m],
            suffix_forbidden: vec![false; m],
            prefix_forbidden: vec![false; m],
            first: (0..m).collect(),
            last: (0..m).collect(),
            chains: PrefixChains::new(m, batch_size),
        }
    }

    fn build(mut self) -> OverlapPath {
        let num_batches = self.m.div_ceil(self.batch_size);
        for d in (0..self.k).rev() {
            for part in 0..num_batches {
                let lo = part * self.batch_size;
                let hi = self.m.min(lo + self.batch_size);
                self.index_batch(d, lo..hi);
                self.attach_edges(d);
            }
        }
        OverlapPath {
            edge_from: self.edge_from,
            overlaps: self.overlaps,
        }
    }

    /// Rebuild the prefix chains over one batch of candidate targets.
    fn index_batch(&mut self, d: usize, range: Range<usize>) {
        let kmers = self.kmers;
        let k = self.k;
        self.chains.rebuild(range, &self.prefix_forbidden, |i| {
            bit_prefix(vertex_kmer(kmers, i, k), k, d)
        });
    }

    /// For every vertex that still lacks an outgoing edge, look for an
    /// indexed target whose d-prefix equals the vertex's d-suffix and
    /// commit the first legal one.
    fn attach_edges(&mut self, d: usize) {
        for i in 0..self.m {
            if self.suffix_forbidden[i] {
                continue;
            }
            let suffix = bit_suffix(vertex_kmer(self.kmers, i, self.k), d);
            let mut j = self.chains.head(suffix);
            if j == NONE {
                continue;
            }
            let mut previous = j;
            // Skip targets that would close a cycle, join a k-mer to its
            // own complement strand, or already have an incoming edge.
            while j != NONE
                && (self.first[i] % self.n == j % self.n
                    || self.first[i] % self.n == self.last[j] % self.n
                    || self.prefix_forbidden[j])
            {
                let after = self.chains.next_of(j);
                // Splice out dead chain nodes so each is walked at most
                // once per overlap length. The chain head itself is left
                // in place; it gets spliced on a later walk.
                if self.prefix_forbidden[j] {
                    self.chains.set_next(previous, after);
                } else {
                    previous = j;
                }
                j = after;
            }
            if j == NONE {
                continue;
            }
            self.commit(i, j, d);
            let after = self.chains.next_of(j);
            self.chains.set_next(previous, after);
        }
    }

    /// Commit the edge i -> j, and its mirror on the complement strand.
    fn commit(&mut self, i: usize, j: usize, d: usize) {
        self.add_edge(i, j, d);
        if self.complements {
            self.add_edge((j + self.n) % self.m, (i + self.n) % self.m, d);
        }
    }

    fn add_edge(&mut self, x: usize, y: usize, d: usize) {
        self.edge_from[x] = y;
        self.overlaps[x] = d as u8;
        self.prefix_forbidden[y] = true;
        self.first[self.last[y]] = self.first[x];
        self.last[self.first[x]] = self.last[y];
        self.suffix_forbidden[x] = true;
    }
}
