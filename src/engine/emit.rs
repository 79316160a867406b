//! Masked superstring emission from an overlap path.
//!
//! Uppercase characters mark positions where a k-mer of the input set
//! starts; lowercase characters are filler (gap nucleotides between two
//! k-mers whose overlap is shorter than k-1, and the trailing k-1
//! characters of the final k-mer).

use anyhow::Result;
use std::io::Write;

use crate::engine::global::OverlapPath;
use crate::engine::{vertex_kmer, NONE};
use crate::kmer::codec::{bit_prefix, bit_suffix, decode, nucleotide_at, KmerBits};

/// Walk the path starting at the first vertex with no incoming edge and
/// write the masked superstring.
///
/// With complements on the path structure holds two mirrored paths; only
/// the one found first is written, which covers every k-mer up to
/// reverse complement.
pub fn write_superstring<B: KmerBits, W: Write>(
    path: &OverlapPath,
    kmers: &[B],
    k: usize,
    complements: bool,
    out: &mut W,
) -> Result<()> {
    let m = kmers.len() * (1 + complements as usize);

    let mut is_start = vec![true; m];
    for &succ in &path.edge_from {
        if succ != NONE {
            is_start[succ] = false;
        }
    }
    let start = (0..m)
        .find(|&i| is_start[i])
        .expect("overlap path has no start vertex");

    let mut v = start;
    // Running (k-1)-suffix of the current k-mer; gap characters are cut
    // from its front.
    let mut tail = bit_suffix(vertex_kmer(kmers, v, k), k - 1);
    out.write_all(&[nucleotide_at(vertex_kmer(kmers, v, k), k, 0)])?;

    while path.edge_from[v] != NONE {
        let d = path.overlaps[v] as usize;
        if d != k - 1 {
            let gap = bit_prefix(tail, k - 1, k - 1 - d);
            out.write_all(decode(gap, k - 1 - d).to_ascii_lowercase().as_bytes())?;
        }
        v = path.edge_from[v];
        let kmer = vertex_kmer(kmers, v, k);
        tail = bit_suffix(kmer, k - 1);
        out.write_all(&[nucleotide_at(kmer, k, 0)])?;
    }

    out.write_all(decode(tail, k - 1).to_ascii_lowercase().as_bytes())?;
    Ok(())
}
