//! Local engine: generalized simplitigs.
//!
//! Seeds a simplitig from an arbitrary remaining k-mer and extends it on
//! both ends, allowing up to d_max - 1 unmasked nucleotides between
//! consecutive matched k-mers. Far less memory than the global engine
//! (no path arrays, no prefix index) at the cost of a somewhat longer
//! superstring.

use anyhow::Result;
use std::collections::VecDeque;
use std::io::Write;

use crate::kmer::codec::{bit_prefix, bit_suffix, nucleotide_at, KmerBits};
use crate::kmer::set::KmerSet;

/// Default gap budget of the driver.
pub const DEFAULT_D_MAX: usize = 5;

/// Find a k-mer extending `last` to the right with overlap k - d, trying
/// the 4^d possible extensions in ascending numeric order. Returns the
/// extension and the extending k-mer.
pub fn right_extension<B: KmerBits>(last: B, kmers: &KmerSet<B>, d: usize) -> Option<(B, B)> {
    let k = kmers.k();
    let count = B::ONE << (2 * d) as u32;
    let mut ext = B::ZERO;
    while ext < count {
        let next = (bit_suffix(last, k - d) << (2 * d) as u32) | ext;
        if kmers.contains_any_orientation(next) {
            return Some((ext, next));
        }
        ext = ext + B::ONE;
    }
    None
}

/// Mirror of [`right_extension`]: find a k-mer extending `first` to the
/// left with overlap k - d.
pub fn left_extension<B: KmerBits>(first: B, kmers: &KmerSet<B>, d: usize) -> Option<(B, B)> {
    let k = kmers.k();
    let count = B::ONE << (2 * d) as u32;
    let mut ext = B::ZERO;
    while ext < count {
        let next = (ext << (2 * (k - d)) as u32) | bit_prefix(first, k, k - d);
        if kmers.contains_any_orientation(next) {
            return Some((ext, next));
        }
        ext = ext + B::ONE;
    }
    None
}

/// Grow one simplitig from `begin` and write it out. Every k-mer used is
/// erased from the set.
///
/// The side with the smaller pending gap is tried first (ties go right).
/// A failed try increases that side's gap; a successful one resets it to
/// 1, so each iteration either consumes a k-mer or makes progress toward
/// termination.
fn next_simplitig<B: KmerBits, W: Write>(
    kmers: &mut KmerSet<B>,
    begin: B,
    d_max: usize,
    out: &mut W,
) -> Result<()> {
    let k = kmers.k();
    let mut first = begin;
    let mut last = begin;
    let mut simplitig: VecDeque<u8> = VecDeque::new();
    simplitig.push_back(nucleotide_at(begin, k, 0));
    kmers.erase_any_orientation(begin);

    let mut d_l = 1usize;
    let mut d_r = 1usize;
    while d_l <= d_max || d_r <= d_max {
        if d_r <= d_l {
            match right_extension(last, kmers, d_r) {
                Some((_, next)) => {
                    kmers.erase_any_orientation(next);
                    for i in 1..d_r {
                        simplitig.push_back(nucleotide_at(last, k, i).to_ascii_lowercase());
                    }
                    simplitig.push_back(nucleotide_at(last, k, d_r));
                    last = next;
                    d_r = 1;
                }
                None => d_r += 1,
            }
        } else {
            match left_extension(first, kmers, d_l) {
                Some((_, next)) => {
                    kmers.erase_any_orientation(next);
                    for i in (1..d_l).rev() {
                        simplitig.push_front(nucleotide_at(next, k, i).to_ascii_lowercase());
                    }
                    simplitig.push_front(nucleotide_at(next, k, 0));
                    first = next;
                    d_l = 1;
                }
                None => d_l += 1,
            }
        }
    }

    // Trailing k-1 characters of the final k-mer.
    for i in 1..k {
        simplitig.push_back(nucleotide_at(last, k, i).to_ascii_lowercase());
    }

    let (front, back) = simplitig.as_slices();
    out.write_all(front)?;
    out.write_all(back)?;
    Ok(())
}

/// Compute generalized simplitigs greedily until the set is drained,
/// writing each one as it completes.
pub fn local_superstring<B: KmerBits, W: Write>(
    kmers: &mut KmerSet<B>,
    d_max: usize,
    out: &mut W,
) -> Result<()> {
    while let Some(begin) = kmers.next_seed() {
        next_simplitig(kmers, begin, d_max, out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kmer::codec::encode;

    fn set_of(strs: &[&str], k: usize, complements: bool) -> KmerSet<u64> {
        let mut set = KmerSet::new(k, complements);
        for s in strs {
            set.insert(encode(s).unwrap());
        }
        set
    }

    #[test]
    fn test_right_extension_found() {
        // ACT extended by A gives CTA.
        let set = set_of(&["TCC", "CTA", "ACT", "CCT"], 3, false);
        let got = right_extension(0b000111u64, &set, 1);
        assert_eq!(got, Some((0b00, 0b011100)));
    }

    #[test]
    fn test_right_extension_with_longer_gap() {
        // TTT extended by CC gives TCC.
        let set = set_of(&["TCC", "ACT", "CCT"], 3, false);
        let got = right_extension(0b111111u64, &set, 2);
        assert_eq!(got, Some((0b0101, 0b110101)));
    }

    #[test]
    fn test_right_extension_absent() {
        let set = set_of(&["TCC", "ACT", "CCT"], 3, false);
        assert_eq!(right_extension(0b000111u64, &set, 1), None);
    }

    #[test]
    fn test_left_extension() {
        let set = set_of(&["TCC", "ACT", "CCT"], 3, false);
        assert_eq!(left_extension(0b000111u64, &set, 1), None);

        // TAC extended by C on the left gives CTA.
        let set = set_of(&["TCC", "CTA", "ACT", "CCT"], 3, false);
        let got = left_extension(0b110001u64, &set, 1);
        assert_eq!(got, Some((0b01, 0b011100)));
    }

    fn run_local(strs: &[&str], k: usize, d_max: usize, complements: bool) -> String {
        let mut set = set_of(strs, k, complements);
        let mut buf = Vec::new();
        local_superstring(&mut set, d_max, &mut buf).unwrap();
        assert!(set.is_empty());
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_single_simplitig() {
        assert_eq!(run_local(&["GCT", "TAA", "AAA"], 3, 2, false), "GcTAaa");
        // A different seed order converges to the same superstring here.
        assert_eq!(run_local(&["TAA", "AAA", "GCT"], 3, 2, false), "GcTAaa");
    }

    #[test]
    fn test_gap_shorter_than_budget() {
        assert_eq!(run_local(&["AACA", "ACAA"], 4, 2, false), "AAcaa");
    }

    #[test]
    fn test_long_kmers() {
        let got = run_local(
            &[
                "TTTCTTTTTTTTTTTTTTTTTTTTTTTTTTG",
                "TTCTTTTTTTTTTTTTTTTTTTTTTTTTTGA",
            ],
            31,
            5,
            false,
        );
        assert_eq!(got, "TTtcttttttttttttttttttttttttttga");
    }

    #[test]
    fn test_complements_drain_both_strands() {
        // Three complement pairs collapse into one simplitig.
        let got = run_local(
            &["ACAA", "ATTT", "TGTT", "AAAT", "TTGT", "AACA"],
            4,
            2,
            true,
        );
        assert_eq!(got, "AAcAaat");
    }

    #[test]
    fn test_zero_gap_budget_emits_isolated_kmers() {
        let got = run_local(&["TTT", "CCC"], 3, 0, false);
        assert_eq!(got, "TttCcc");
    }
}
