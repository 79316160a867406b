//! The two superstring engines and their shared path machinery.

pub mod emit;
pub mod global;
pub mod local;
pub(crate) mod prefix;

use crate::kmer::codec::{reverse_complement, KmerBits};

/// Sentinel vertex index meaning "none".
pub const NONE: usize = usize::MAX;

/// K-mer of vertex `i`. Indices past the stored range denote the reverse
/// complements of the stored k-mers, computed lazily so the second strand
/// costs no memory.
#[inline]
pub(crate) fn vertex_kmer<B: KmerBits>(kmers: &[B], i: usize, k: usize) -> B {
    let n = kmers.len();
    if i < n {
        kmers[i]
    } else {
        reverse_complement(kmers[i - n], k)
    }
}
