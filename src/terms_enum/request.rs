//! Client-facing terms enumeration request.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cluster::routing::Preference;
use crate::error::{Result, TermwalkError};
use crate::shard::response::ShardTermsRequest;
use crate::shard::store::ShardId;
use crate::terms_enum::config::TermsEnumConfig;
use crate::term::Term;

/// Enumerate the terms of one field of one index.
///
/// Callers page through a field by re-issuing the request with `from` set to
/// the term after the last one they received (or to the last one and
/// dropping the repeated first term).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermsEnumRequest {
    /// Target index.
    pub index: String,
    /// Field to enumerate. Required.
    pub field: Option<String>,
    /// Maximum number of terms; config default when unset.
    pub size: Option<usize>,
    /// Inclusive lower bound.
    pub from: Option<Term>,
    /// Minimum summed document frequency within a shard.
    pub min_doc_freq: u64,
    /// Shard copy routing preference.
    pub preference: Option<Preference>,
    /// Deadline for the whole call; config default when unset.
    pub timeout: Option<Duration>,
}

impl TermsEnumRequest {
    /// Create a request for `field` of `index`.
    pub fn new(index: impl Into<String>, field: impl Into<String>) -> Self {
        TermsEnumRequest {
            index: index.into(),
            field: Some(field.into()),
            size: None,
            from: None,
            min_doc_freq: 0,
            preference: None,
            timeout: None,
        }
    }

    /// Create a request without a field (only useful to exercise validation).
    pub fn for_index(index: impl Into<String>) -> Self {
        TermsEnumRequest {
            field: None,
            ..Self::new(index, "")
        }
    }

    /// Set the maximum number of terms.
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    /// Start at the first term greater than or equal to `from`.
    pub fn with_from(mut self, from: impl Into<Term>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Set the minimum document frequency.
    pub fn with_min_doc_freq(mut self, min_doc_freq: u64) -> Self {
        self.min_doc_freq = min_doc_freq;
        self
    }

    /// Set the routing preference.
    pub fn with_preference(mut self, preference: Preference) -> Self {
        self.preference = Some(preference);
        self
    }

    /// Set the timeout for this call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Check the request before anything is dispatched.
    pub fn validate(&self, config: &TermsEnumConfig) -> Result<()> {
        if self.index.is_empty() {
            return Err(TermwalkError::validation("index is required"));
        }
        match self.field.as_deref() {
            None | Some("") => return Err(TermwalkError::validation("field is required")),
            Some(_) => {}
        }

        let size = self.effective_size(config);
        if size == 0 {
            return Err(TermwalkError::validation("size must be positive"));
        }
        if size > config.max_size {
            return Err(TermwalkError::validation(format!(
                "size {size} exceeds the maximum of {}",
                config.max_size
            )));
        }
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(TermwalkError::validation("timeout must be positive"));
        }
        Ok(())
    }

    /// Size after applying the configured default.
    pub fn effective_size(&self, config: &TermsEnumConfig) -> usize {
        self.size.unwrap_or(config.default_size)
    }

    /// Timeout after applying the configured default.
    pub fn effective_timeout(&self, config: &TermsEnumConfig) -> Duration {
        self.timeout.unwrap_or(config.default_timeout)
    }

    /// The sub-request sent to one shard.
    pub fn shard_request(&self, shard_id: ShardId, config: &TermsEnumConfig) -> ShardTermsRequest {
        ShardTermsRequest {
            shard_id,
            field: self.field.clone().unwrap_or_default(),
            from: self.from.clone(),
            size: self.effective_size(config),
            min_doc_freq: self.min_doc_freq,
            preference: self.preference.clone(),
        }
    }
}
