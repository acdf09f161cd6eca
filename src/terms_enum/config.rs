//! Configuration for terms enumeration.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TermwalkError};

/// Configuration for the terms enumeration coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TermsEnumConfig {
    /// Number of terms returned when a request does not say.
    pub default_size: usize,

    /// Largest `size` a request may ask for.
    pub max_size: usize,

    /// Timeout for a whole call when the request does not set one.
    pub default_timeout: Duration,

    /// Thread pool size for shard execution.
    /// If None, uses the number of CPU cores.
    pub thread_pool_size: Option<usize>,

    /// Whether a call that times out merges the shards that did reply
    /// instead of failing.
    pub allow_partial_results: bool,

    /// Whether to enable metrics collection.
    pub enable_metrics: bool,
}

impl Default for TermsEnumConfig {
    fn default() -> Self {
        Self {
            default_size: 10,
            max_size: 10_000,
            default_timeout: Duration::from_secs(30),
            thread_pool_size: None,
            allow_partial_results: false,
            enable_metrics: true,
        }
    }
}

impl TermsEnumConfig {
    /// Load a configuration from a JSON file; missing keys take defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let config: TermsEnumConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for consistency.
    pub fn validate(&self) -> Result<()> {
        if self.default_size == 0 {
            return Err(TermwalkError::invalid_config("default_size must be positive"));
        }
        if self.default_size > self.max_size {
            return Err(TermwalkError::invalid_config(format!(
                "default_size {} exceeds max_size {}",
                self.default_size, self.max_size
            )));
        }
        if self.default_timeout.is_zero() {
            return Err(TermwalkError::invalid_config("default_timeout must be positive"));
        }
        if self.thread_pool_size == Some(0) {
            return Err(TermwalkError::invalid_config("thread_pool_size must be positive"));
        }
        Ok(())
    }

    /// Set the default size.
    pub fn with_default_size(mut self, size: usize) -> Self {
        self.default_size = size;
        self
    }

    /// Set the default timeout.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Set whether partial results are allowed on timeout.
    pub fn with_partial_results(mut self, allow: bool) -> Self {
        self.allow_partial_results = allow;
        self
    }

    /// Set the thread pool size.
    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = Some(size);
        self
    }
}
