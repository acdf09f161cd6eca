//! Output formatting for CLI commands.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, TermwalkArgs};
use crate::error::Result;
use crate::terms_enum::{ShardFailure, TermsEnumResponse};

/// Result structure for indexing.
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexingResult {
    pub index: String,
    pub documents_indexed: u64,
    pub shards: u32,
    pub segments_written: usize,
    pub duration_ms: u64,
}

/// Result structure for a terms call.
#[derive(Debug, Serialize, Deserialize)]
pub struct TermsResult {
    pub terms: Vec<String>,
    pub total_shards: usize,
    pub successful_shards: usize,
    pub failed_shards: usize,
    pub failures: Vec<ShardFailure>,
    pub timed_out: bool,
    pub took_ms: u64,
}

impl From<TermsEnumResponse> for TermsResult {
    fn from(response: TermsEnumResponse) -> Self {
        TermsResult {
            terms: response.term_strings(),
            total_shards: response.total_shards,
            successful_shards: response.successful_shards,
            failed_shards: response.failed_shards,
            failures: response.failures,
            timed_out: response.timed_out,
            took_ms: response.took.as_millis() as u64,
        }
    }
}

/// Index statistics.
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexStats {
    pub index: String,
    pub total_documents: u64,
    pub total_segments: usize,
    pub shards: Vec<ShardStats>,
}

/// Statistics of one shard.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShardStats {
    pub shard: u32,
    pub documents: u64,
    pub segments: usize,
    /// Distinct terms per field, summed over segments.
    pub field_terms: Option<BTreeMap<String, u64>>,
}

/// Rendering of a result for the human output format.
pub trait HumanOutput {
    /// Lines to print.
    fn render(&self) -> String;
}

impl HumanOutput for IndexingResult {
    fn render(&self) -> String {
        format!(
            "Indexed {} documents into [{}] ({} shards, {} segments) in {} ms",
            self.documents_indexed, self.index, self.shards, self.segments_written, self.duration_ms
        )
    }
}

impl HumanOutput for TermsResult {
    fn render(&self) -> String {
        let mut out = String::new();
        for term in &self.terms {
            let _ = writeln!(out, "{term}");
        }
        let _ = write!(
            out,
            "\n{} terms from {}/{} shards in {} ms",
            self.terms.len(),
            self.successful_shards,
            self.total_shards,
            self.took_ms
        );
        if self.timed_out {
            out.push_str(" (timed out)");
        }
        for failure in &self.failures {
            let _ = write!(out, "\n  shard {} failed: {}", failure.shard_id, failure.reason);
        }
        out
    }
}

impl HumanOutput for IndexStats {
    fn render(&self) -> String {
        let mut out = format!(
            "Index [{}]: {} documents in {} segments",
            self.index, self.total_documents, self.total_segments
        );
        for shard in &self.shards {
            let _ = write!(
                out,
                "\n  shard {}: {} documents, {} segments",
                shard.shard, shard.documents, shard.segments
            );
            if let Some(fields) = &shard.field_terms {
                for (field, terms) in fields {
                    let _ = write!(out, "\n    {field}: {terms} terms");
                }
            }
        }
        out
    }
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize + HumanOutput>(
    message: &str,
    result: &T,
    args: &TermwalkArgs,
) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 1 {
                println!("{message}");
                println!();
            }
            println!("{}", result.render());
        }
        OutputFormat::Json => {
            let json = if args.pretty {
                serde_json::to_string_pretty(result)?
            } else {
                serde_json::to_string(result)?
            };
            println!("{json}");
        }
    }
    Ok(())
}
