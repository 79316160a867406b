//! Driver: routes by key width, runs the selected engine and writes the
//! masked superstring.

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

use crate::cli::MAX_K;
use crate::engine::emit::write_superstring;
use crate::engine::global::overlap_hamiltonian_path;
use crate::engine::local::local_superstring;
use crate::io::fasta::{read_kmers, FastaSource};
use crate::kmer::codec::KmerBits;

/// Which superstring engine to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Engine {
    Global,
    Local,
}

/// A validated run configuration.
pub struct ComputeConfig {
    pub path: PathBuf,
    pub k: usize,
    pub d_max: usize,
    pub engine: Engine,
    pub output: Option<PathBuf>,
    pub complements: bool,
    pub batches: usize,
}

/// Run one computation. K-mers fitting 64 bits use the narrow engines;
/// larger k routes to the 128-bit ones.
///
/// The k bounds are checked here as well as in the CLI layer, so a
/// configuration built directly cannot reach the engines with a k they
/// do not support.
pub fn run(config: &ComputeConfig) -> Result<()> {
    if config.k == 0 {
        bail!("k must be positive");
    }
    if config.k > MAX_K {
        bail!("k = {} is not supported, the maximum is {MAX_K}", config.k);
    }
    if config.k <= <u64 as KmerBits>::MAX_K {
        run_with_width::<u64>(config)
    } else {
        run_with_width::<u128>(config)
    }
}

fn run_with_width<B: KmerBits>(config: &ComputeConfig) -> Result<()> {
    let k = config.k;
    let mut source = FastaSource::open(&config.path)?;
    let mut set = read_kmers::<B>(&mut source, k, config.complements)?;
    if set.is_empty() {
        bail!(
            "'{}' contains no k-mers of length {k}",
            config.path.display()
        );
    }
    info!("{} distinct k-mers (k={k})", set.len());

    // The header carries the body length, so the body is built in memory
    // first.
    let mut body: Vec<u8> = Vec::new();
    match config.engine {
        Engine::Global => {
            let mut kmers = set.into_kmer_vec();
            if config.batches > 1 {
                // Group shared prefixes so each batch of the prefix index
                // covers a narrow key range.
                kmers.sort_unstable();
            }
            info!("running global ({} batches per overlap length)", config.batches);
            let path = overlap_hamiltonian_path(&kmers, k, config.complements, config.batches);
            write_superstring(&path, &kmers, k, config.complements, &mut body)?;
        }
        Engine::Local => {
            let d_max = config.d_max.min(k - 1);
            info!("running local (d_max={d_max})");
            local_superstring(&mut set, d_max, &mut body)?;
        }
    }

    let mut out: Box<dyn Write> = match &config.output {
        Some(p) => Box::new(BufWriter::new(File::create(p).with_context(|| {
            format!("failed to create {}", p.display())
        })?)),
        None => Box::new(BufWriter::new(std::io::stdout())),
    };
    writeln!(out, ">superstring l={} k={k}", body.len())?;
    out.write_all(&body)?;
    writeln!(out)?;
    out.flush()?;
    info!("wrote {} superstring characters", body.len());
    Ok(())
}
