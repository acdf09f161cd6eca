//! Client-facing terms enumeration response.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::shard::store::ShardId;
use crate::term::Term;

/// Why a shard contributed nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardFailure {
    /// The shard.
    pub shard_id: ShardId,
    /// Human-readable reason.
    pub reason: String,
    /// Whether the shard was abandoned because the call timed out.
    pub timed_out: bool,
}

impl ShardFailure {
    /// A shard that replied with an error.
    pub fn new(shard_id: ShardId, reason: impl Into<String>) -> Self {
        ShardFailure {
            shard_id,
            reason: reason.into(),
            timed_out: false,
        }
    }

    /// A shard still outstanding when the call timed out.
    pub fn timed_out(shard_id: ShardId) -> Self {
        ShardFailure {
            shard_id,
            reason: "timed out".to_string(),
            timed_out: true,
        }
    }
}

/// Terms of a field across all shards that replied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermsEnumResponse {
    /// Sorted, deduplicated terms; at most the requested size.
    pub terms: Vec<Term>,
    /// Shards the request was resolved to.
    pub total_shards: usize,
    /// Shards that replied successfully.
    pub successful_shards: usize,
    /// Shards that failed or timed out.
    pub failed_shards: usize,
    /// Details of the failed shards.
    pub failures: Vec<ShardFailure>,
    /// Whether the call hit its deadline.
    pub timed_out: bool,
    /// Wall time of the call.
    pub took: Duration,
}

impl TermsEnumResponse {
    /// The terms as strings.
    pub fn term_strings(&self) -> Vec<String> {
        self.terms.iter().map(|t| t.to_string()).collect()
    }

    /// Whether some shards are missing from the result.
    pub fn is_partial(&self) -> bool {
        self.failed_shards > 0
    }

    /// The `from` value that continues after this page, if any terms came back.
    pub fn last_term(&self) -> Option<&Term> {
        self.terms.last()
    }
}
