//! Error types for the termwalk library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`TermwalkError`] enum. Only validation and shard resolution errors ever
//! reach the caller of a term enumeration; source read errors and individual
//! shard failures are absorbed lower down and degrade the result instead.
//!
//! # Examples
//!
//! ```
//! use termwalk::error::{Result, TermwalkError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(TermwalkError::validation("field is required"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for termwalk operations.
#[derive(Error, Debug)]
pub enum TermwalkError {
    /// I/O errors (segment files, configuration files, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The request was rejected before any shard was contacted.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Shard resolution failed (unknown index, blocked cluster, no shards).
    #[error("Routing error: {0}")]
    Routing(String),

    /// A single shard could not serve its sub-request.
    #[error("Shard error: {0}")]
    Shard(String),

    /// Segment storage errors (bad magic, checksum mismatch, ...).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Errors raised by a term source while reading its dictionary.
    #[error("Term source error: {0}")]
    TermSource(String),

    /// Transport errors between coordinator and shard.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The call did not complete within its deadline.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Every dispatched shard failed.
    #[error("All shards failed: {0}")]
    AllShardsFailed(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary wire encoding errors
    #[error("Encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error, displayed with its context chain
    #[error("Anyhow error: {0:#}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with TermwalkError.
pub type Result<T> = std::result::Result<T, TermwalkError>;

impl TermwalkError {
    /// Create a new validation error.
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        TermwalkError::Validation(msg.into())
    }

    /// Create a new routing error.
    pub fn routing<S: Into<String>>(msg: S) -> Self {
        TermwalkError::Routing(msg.into())
    }

    /// Create a new shard error.
    pub fn shard<S: Into<String>>(msg: S) -> Self {
        TermwalkError::Shard(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        TermwalkError::Storage(msg.into())
    }

    /// Create a new term source error.
    pub fn term_source<S: Into<String>>(msg: S) -> Self {
        TermwalkError::TermSource(msg.into())
    }

    /// Create a new transport error.
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        TermwalkError::Transport(msg.into())
    }

    /// Create a new timeout error.
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        TermwalkError::Timeout(msg.into())
    }

    /// Create a new all-shards-failed error.
    pub fn all_shards_failed<S: Into<String>>(msg: S) -> Self {
        TermwalkError::AllShardsFailed(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        TermwalkError::InvalidConfig(msg.into())
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        TermwalkError::Other(format!("Internal error: {}", msg.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = TermwalkError::validation("field is required");
        assert_eq!(error.to_string(), "Validation error: field is required");

        let error = TermwalkError::routing("no such index [logs]");
        assert_eq!(error.to_string(), "Routing error: no such index [logs]");

        let error = TermwalkError::timeout("2 shards outstanding");
        assert_eq!(error.to_string(), "Timeout: 2 shards outstanding");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = TermwalkError::from(io_error);

        match error {
            TermwalkError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }

    #[test]
    fn test_context_conversion_keeps_chain() {
        use anyhow::Context;

        let result: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::NotFound, "missing"));
        let error = TermwalkError::from(result.context("opening docs.jsonl").unwrap_err());

        assert!(matches!(error, TermwalkError::Anyhow(_)));
        assert_eq!(error.to_string(), "Anyhow error: opening docs.jsonl: missing");
    }
}
