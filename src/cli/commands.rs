//! Command implementations for the termwalk CLI.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::hash::BuildHasher;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cli::args::*;
use crate::cli::output::*;
use crate::cluster::routing::{ClusterService, ClusterState, Preference};
use crate::cluster::transport::LocalTransport;
use crate::error::{Result, TermwalkError};
use crate::lexical::analyzer::UnicodeWordAnalyzer;
use crate::lexical::segment::SegmentWriter;
use crate::shard::store::{Shard, ShardId};
use crate::terms_enum::{TermsEnumConfig, TermsEnumCoordinator, TermsEnumRequest};

/// Node name used when serving an on-disk index from this process.
const LOCAL_NODE: &str = "local";

/// Field naming the routing key of a document.
const ID_FIELD: &str = "_id";

/// Execute a CLI command.
pub fn execute_command(args: TermwalkArgs) -> Result<()> {
    match &args.command {
        Command::Index(index_args) => index_documents(index_args, &args),
        Command::Terms(terms_args) => enumerate_terms(terms_args, &args),
        Command::Stats(stats_args) => show_stats(stats_args, &args),
    }
}

/// Directory of one shard of an index.
pub fn shard_dir(data_dir: &Path, index: &str, shard: u32) -> PathBuf {
    data_dir.join(index).join(format!("shard_{shard}"))
}

/// Number of shards of an on-disk index (highest shard number plus one).
pub fn discover_shard_count(data_dir: &Path, index: &str) -> Result<u32> {
    let index_dir = data_dir.join(index);
    if !index_dir.is_dir() {
        return Err(TermwalkError::routing(format!(
            "no such index [{index}] in {}",
            data_dir.display()
        )));
    }

    let mut count = 0;
    for entry in fs::read_dir(&index_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let shard = name
            .to_str()
            .and_then(|name| name.strip_prefix("shard_"))
            .and_then(|number| number.parse::<u32>().ok());
        if let Some(shard) = shard {
            count = count.max(shard + 1);
        }
    }
    if count == 0 {
        return Err(TermwalkError::routing(format!("index [{index}] has no shards")));
    }
    Ok(count)
}

/// Shard a document routes to.
pub fn route_document(routing_key: &str, shards: u32) -> u32 {
    let hasher = ahash::RandomState::with_seeds(3, 7, 11, 13);
    (BuildHasher::hash_one(&hasher, routing_key) % u64::from(shards)) as u32
}

/// Open every shard of an on-disk index.
pub fn open_shards(data_dir: &Path, index: &str) -> Result<Vec<Shard>> {
    let count = discover_shard_count(data_dir, index)?;
    (0..count)
        .map(|shard| Shard::open(ShardId::new(index, shard), &shard_dir(data_dir, index, shard)))
        .collect()
}

fn index_documents(args: &IndexArgs, cli_args: &TermwalkArgs) -> Result<()> {
    if args.shards == 0 {
        return Err(TermwalkError::validation("shards must be positive"));
    }
    if args.segment_size == 0 {
        return Err(TermwalkError::validation("segment-size must be positive"));
    }

    let start = Instant::now();
    info!(index = %args.index, file = %args.documents.display(), "indexing documents");

    let mut analyzer = UnicodeWordAnalyzer::new();
    if let Some(max) = args.max_token_length {
        analyzer = analyzer.with_max_token_length(max);
    }
    let new_writer = || SegmentWriter::new().with_analyzer(analyzer.clone());

    let file = File::open(&args.documents)
        .with_context(|| format!("failed to open documents {}", args.documents.display()))?;
    let reader = BufReader::new(file);
    let mut writers: Vec<SegmentWriter> = (0..args.shards).map(|_| new_writer()).collect();
    let mut documents = 0u64;
    let mut segments_written = 0usize;

    for (line_number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let value = serde_json::from_str::<Value>(&line).with_context(|| {
            format!("invalid JSON on line {} of {}", line_number + 1, args.documents.display())
        })?;
        let fields = match value {
            Value::Object(fields) => fields,
            _ => {
                warn!(line = line_number + 1, "skipping line that is not a JSON object");
                continue;
            }
        };

        let routing_key = match fields.get(ID_FIELD) {
            Some(Value::String(id)) => id.clone(),
            Some(other) => other.to_string(),
            None => line_number.to_string(),
        };
        let shard = route_document(&routing_key, args.shards) as usize;

        let text_fields = fields
            .iter()
            .filter(|(name, _)| name.as_str() != ID_FIELD)
            .filter_map(|(name, value)| value.as_str().map(|text| (name.clone(), text)));
        writers[shard].add_document(text_fields);
        documents += 1;

        if writers[shard].doc_count() as usize >= args.segment_size {
            let full = std::mem::replace(&mut writers[shard], new_writer());
            let path = full.write_to_dir(&shard_dir(&args.data_dir, &args.index, shard as u32))?;
            debug!(path = %path.display(), "wrote segment");
            segments_written += 1;
        }
    }

    for (shard, writer) in writers.into_iter().enumerate() {
        let dir = shard_dir(&args.data_dir, &args.index, shard as u32);
        if writer.doc_count() > 0 {
            let path = writer.write_to_dir(&dir)?;
            debug!(path = %path.display(), "wrote segment");
            segments_written += 1;
        } else {
            fs::create_dir_all(&dir)?;
        }
    }

    info!(documents, segments = segments_written, "indexing finished");
    output_result(
        "Documents indexed",
        &IndexingResult {
            index: args.index.clone(),
            documents_indexed: documents,
            shards: args.shards,
            segments_written,
            duration_ms: start.elapsed().as_millis() as u64,
        },
        cli_args,
    )
}

fn load_config(args: &TermsArgs) -> Result<TermsEnumConfig> {
    let mut config = match &args.config {
        Some(path) => TermsEnumConfig::from_file(path)?,
        None => TermsEnumConfig::default(),
    };
    if args.allow_partial_results {
        config.allow_partial_results = true;
    }
    Ok(config)
}

fn build_request(args: &TermsArgs) -> Result<TermsEnumRequest> {
    let mut request = TermsEnumRequest::new(args.index.as_str(), args.field.as_str())
        .with_min_doc_freq(args.min_doc_freq);
    if let Some(size) = args.size {
        request = request.with_size(size);
    }
    if let Some(from) = &args.from {
        request = request.with_from(from.as_str());
    }
    if let Some(preference) = &args.preference {
        request = request.with_preference(preference.parse::<Preference>()?);
    }
    if let Some(timeout_ms) = args.timeout_ms {
        request = request.with_timeout(Duration::from_millis(timeout_ms));
    }
    Ok(request)
}

fn enumerate_terms(args: &TermsArgs, cli_args: &TermwalkArgs) -> Result<()> {
    let config = load_config(args)?;
    let request = build_request(args)?;

    let shards = open_shards(&args.data_dir, &args.index)?;
    let state = ClusterState::single_node(LOCAL_NODE, &args.index, shards.len() as u32);
    let transport = LocalTransport::new(config.thread_pool_size)?;
    for shard in shards {
        transport.add_shard(LOCAL_NODE, shard);
    }

    let coordinator =
        TermsEnumCoordinator::new(config, Arc::new(ClusterService::new(state)), Arc::new(transport));
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    info!(index = %args.index, field = %args.field, "enumerating terms");
    let response = runtime.block_on(coordinator.execute(request))?;

    output_result("Terms", &TermsResult::from(response), cli_args)
}

fn show_stats(args: &StatsArgs, cli_args: &TermwalkArgs) -> Result<()> {
    let shards = open_shards(&args.data_dir, &args.index)?;

    let shard_stats: Vec<ShardStats> = shards
        .iter()
        .map(|shard| {
            let field_terms = args.fields.then(|| {
                let mut counts: BTreeMap<String, u64> = BTreeMap::new();
                for segment in shard.segments() {
                    for field in segment.fields() {
                        if let Some(dictionary) = segment.dictionary(field) {
                            *counts.entry(field.to_string()).or_insert(0) += dictionary.len() as u64;
                        }
                    }
                }
                counts
            });
            ShardStats {
                shard: shard.id().shard,
                documents: shard.doc_count(),
                segments: shard.segment_count(),
                field_terms,
            }
        })
        .collect();

    output_result(
        "Index statistics",
        &IndexStats {
            index: args.index.clone(),
            total_documents: shard_stats.iter().map(|s| s.documents).sum(),
            total_segments: shard_stats.iter().map(|s| s.segments).sum(),
            shards: shard_stats,
        },
        cli_args,
    )
}
