//! Command line argument parsing for the termwalk CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// Termwalk - enumerate the terms of a field across the shards of an index
#[derive(Parser, Debug, Clone)]
#[command(name = "termwalk")]
#[command(about = "Sorted term enumeration across the shards of an index")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct TermwalkArgs {
    /// Verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl TermwalkArgs {
    /// Effective verbosity: 0=quiet, 1=normal, 2=verbose, 3+=debug.
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose.saturating_add(1)
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Index JSONL documents into the shards of an index
    Index(IndexArgs),

    /// Enumerate the terms of a field
    Terms(TermsArgs),

    /// Show per-shard statistics of an index
    Stats(StatsArgs),
}

/// Arguments for indexing documents
#[derive(Parser, Debug, Clone)]
pub struct IndexArgs {
    /// Data directory holding the indices
    #[arg(value_name = "DATA_DIR")]
    pub data_dir: PathBuf,

    /// Index name
    #[arg(short, long)]
    pub index: String,

    /// Number of shards
    #[arg(short, long, default_value = "1")]
    pub shards: u32,

    /// Document file (JSONL, one flat object of string fields per line)
    #[arg(short, long, value_name = "FILE")]
    pub documents: PathBuf,

    /// Documents per segment
    #[arg(long, default_value = "1000")]
    pub segment_size: usize,

    /// Drop tokens longer than this many bytes
    #[arg(long)]
    pub max_token_length: Option<usize>,
}

/// Arguments for enumerating terms
#[derive(Parser, Debug, Clone)]
pub struct TermsArgs {
    /// Data directory holding the indices
    #[arg(value_name = "DATA_DIR")]
    pub data_dir: PathBuf,

    /// Index name
    #[arg(short, long)]
    pub index: String,

    /// Field to enumerate
    #[arg(long)]
    pub field: String,

    /// Maximum number of terms
    #[arg(long)]
    pub size: Option<usize>,

    /// Start at this term (inclusive)
    #[arg(long)]
    pub from: Option<String>,

    /// Minimum document frequency within a shard
    #[arg(long, default_value = "0")]
    pub min_doc_freq: u64,

    /// Shard copy preference (_local, _primary or any custom string)
    #[arg(long)]
    pub preference: Option<String>,

    /// Timeout in milliseconds
    #[arg(long, env = "TERMWALK_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Return what replied when the timeout expires
    #[arg(long)]
    pub allow_partial_results: bool,

    /// Configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE", env = "TERMWALK_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Arguments for showing statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// Data directory holding the indices
    #[arg(value_name = "DATA_DIR")]
    pub data_dir: PathBuf,

    /// Index name
    #[arg(short, long)]
    pub index: String,

    /// Include per-field term counts
    #[arg(long)]
    pub fields: bool,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
