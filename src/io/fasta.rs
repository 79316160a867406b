//! FASTA reader — chunked reading plus k-mer extraction.
//!
//! Wraps `paraseq`'s `RecordSet` for buffered reading over a
//! `niffler`-decompressed stream, so plain and compressed FASTA files
//! both work. Record sequences are scanned with a rolling 2-bit window;
//! any character outside ACGT/acgt fails the run.

use anyhow::{bail, Context, Result};
use paraseq::fasta;
use std::path::Path;

use crate::kmer::codec::{nucleotide_code, KmerBits};
use crate::kmer::set::KmerSet;

/// A chunk of record sequences.
pub type SeqChunk = Vec<Vec<u8>>;

const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Sequential FASTA reader that produces chunks of record sequences.
pub struct FastaSource {
    reader: fasta::Reader<Box<dyn std::io::Read + Send>>,
    record_set: fasta::RecordSet,
    chunk_size: usize,
}

impl FastaSource {
    /// Open a FASTA file with automatic decompression (gzip, zstd, ...).
    pub fn open(path: &Path) -> Result<Self> {
        let (reader, _format) = niffler::send::from_path(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        Ok(Self::from_reader(reader))
    }

    /// Wrap an already-open stream; used by tests.
    pub fn from_reader(input: Box<dyn std::io::Read + Send>) -> Self {
        let reader = fasta::Reader::new(input);
        let record_set = reader.new_record_set();
        Self {
            reader,
            record_set,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Read the next chunk of sequences into the provided buffer.
    ///
    /// Returns `Ok(true)` if sequences were produced, `Ok(false)` at EOF.
    pub fn next_chunk(&mut self, chunk: &mut SeqChunk) -> Result<bool> {
        chunk.clear();
        if !self.record_set.fill(&mut self.reader)? {
            return Ok(false);
        }
        for rec in self.record_set.iter() {
            let rec = rec?;
            chunk.push(rec.seq().into_owned());
            if chunk.len() >= self.chunk_size {
                break;
            }
        }
        Ok(!chunk.is_empty())
    }
}

/// Build the k-mer set of everything the source yields.
pub fn read_kmers<B: KmerBits>(
    source: &mut FastaSource,
    k: usize,
    complements: bool,
) -> Result<KmerSet<B>> {
    let mut set = KmerSet::new(k, complements);
    let mut chunk = SeqChunk::new();
    while source.next_chunk(&mut chunk)? {
        for seq in &chunk {
            add_sequence_kmers(&mut set, seq)?;
        }
    }
    Ok(set)
}

/// Slide a rolling 2-bit window over one record and insert every k-mer.
/// Records shorter than k contribute nothing.
pub fn add_sequence_kmers<B: KmerBits>(set: &mut KmerSet<B>, seq: &[u8]) -> Result<()> {
    let k = set.k();
    let mask = (B::ONE << (2 * k) as u32) - B::ONE;
    let mut window = B::ZERO;
    let mut filled = 0usize;
    for &c in seq {
        let code = match nucleotide_code(c) {
            Some(code) => code,
            None => bail!("invalid nucleotide '{}' in input sequence", c as char),
        };
        window = ((window << 2) | B::from_code(code)) & mask;
        filled += 1;
        if filled >= k {
            set.insert(window);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kmer::codec::encode;

    fn source_of(text: &str) -> FastaSource {
        FastaSource::from_reader(Box::new(std::io::Cursor::new(text.as_bytes().to_vec())))
    }

    #[test]
    fn test_read_kmers_from_records() {
        let mut source = source_of(">r1\nACGT\n>r2\nGGG\n");
        let set = read_kmers::<u64>(&mut source, 3, false).unwrap();
        for s in ["ACG", "CGT", "GGG"] {
            assert!(set.contains(encode(s).unwrap()));
        }
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_kmers_do_not_span_records() {
        let mut source = source_of(">r1\nAC\n>r2\nGT\n");
        let set = read_kmers::<u64>(&mut source, 3, false).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_lowercase_accepted() {
        let mut source = source_of(">r\nacgt\n");
        let set = read_kmers::<u64>(&mut source, 4, false).unwrap();
        assert!(set.contains(encode("ACGT").unwrap()));
    }

    #[test]
    fn test_invalid_nucleotide_fails() {
        let mut source = source_of(">r\nACNGT\n");
        assert!(read_kmers::<u64>(&mut source, 3, false).is_err());
    }

    #[test]
    fn test_complements_collapse_on_ingest() {
        // rc(ACG) = CGT: one canonical element.
        let mut source = source_of(">r\nACG\n>r2\nCGT\n");
        let set = read_kmers::<u64>(&mut source, 3, true).unwrap();
        assert_eq!(set.len(), 1);
    }
}
