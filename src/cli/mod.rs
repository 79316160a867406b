//! Command-line surface.
//!
//! A single command with the short-flag interface `-p -k -d -a -o -c -m
//! -h -v`. Argument combinations are validated after parsing; any
//! violation prints the diagnostic plus help and exits with status 1.

pub mod compute;

use anyhow::{bail, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use std::path::PathBuf;

use crate::engine::global::MEMORY_REDUCTION_FACTOR;
use crate::engine::local::DEFAULT_D_MAX;
use compute::{ComputeConfig, Engine};

/// Largest k the 128-bit engines support.
pub const MAX_K: usize = 63;

#[derive(Parser, Debug)]
#[command(
    name = "superstr-rs",
    about = "Compute a masked superstring of the k-mers in a FASTA file",
    disable_version_flag = true
)]
pub struct Cli {
    /// Path to the input FASTA file (gzip accepted)
    #[arg(short = 'p', long)]
    pub path: Option<PathBuf>,

    /// K-mer length (at most 63)
    #[arg(short = 'k', long = "kmer-length")]
    pub k: Option<usize>,

    /// Maximum extension length for local; at most d_max - 1 nucleotides
    /// are left unmasked between consecutive k-mers (default 5)
    #[arg(short = 'd', long = "d-max")]
    pub d_max: Option<usize>,

    /// Algorithm to run
    #[arg(short = 'a', long, default_value = "global", value_enum)]
    pub algorithm: Algorithm,

    /// Output path (stdout if not given)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Treat a k-mer and its reverse complement as the same k-mer
    #[arg(short = 'c', long)]
    pub complements: bool,

    /// Turn off the batched memory reduction in global (faster, but the
    /// prefix index holds all k-mers at once)
    #[arg(short = 'm', long = "no-memory-reduction")]
    pub no_memory_reduction: bool,

    /// Print version
    #[arg(short = 'v', long = "version")]
    pub version: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    /// Greedy longest-overlap superstring
    #[value(name = "global", alias = "greedy")]
    Global,
    /// Generalized simplitigs with gap budget d_max
    #[value(name = "local", alias = "pseudosimplitigs")]
    Local,
    /// Aho-Corasick variant of global (not supported)
    #[value(name = "globalAC", alias = "greedyAC")]
    GlobalAc,
    /// Aho-Corasick variant of local (not supported)
    #[value(name = "localAC", alias = "pseudosimplitigsAC")]
    LocalAc,
}

impl Cli {
    /// Check argument combinations and turn the raw arguments into a run
    /// configuration.
    pub fn into_config(self) -> Result<ComputeConfig> {
        let path = match self.path {
            Some(path) => path,
            None => bail!("required parameter p not set"),
        };
        let k = match self.k {
            Some(k) => k,
            None => bail!("required parameter k not set"),
        };
        if k == 0 {
            bail!("k must be positive");
        }
        if k > MAX_K {
            bail!("k = {k} is not supported, the maximum is {MAX_K}");
        }
        let engine = match self.algorithm {
            Algorithm::Global => Engine::Global,
            Algorithm::Local => Engine::Local,
            Algorithm::GlobalAc | Algorithm::LocalAc => {
                bail!("the Aho-Corasick algorithms are not supported")
            }
        };
        if self.d_max.is_some() && engine != Engine::Local {
            bail!("unsupported argument d for algorithm 'global'");
        }
        if self.no_memory_reduction && engine != Engine::Global {
            bail!("memory reduction turn-off is only supported for global");
        }
        Ok(ComputeConfig {
            path,
            k,
            d_max: self.d_max.unwrap_or(DEFAULT_D_MAX),
            engine,
            output: self.output,
            complements: self.complements,
            batches: if self.no_memory_reduction {
                1
            } else {
                MEMORY_REDUCTION_FACTOR
            },
        })
    }
}

pub fn run() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                e.print()?;
                return Ok(());
            }
            e.print()?;
            let _ = Cli::command().print_help();
            std::process::exit(1);
        }
    };

    if cli.version {
        println!("{}", crate::VERSION);
        return Ok(());
    }

    match cli.into_config() {
        Ok(config) => compute::run(&config),
        Err(err) => {
            eprintln!("{err}");
            let _ = Cli::command().print_help();
            std::process::exit(1);
        }
    }
}
