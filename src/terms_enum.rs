//! Cluster-wide terms enumeration.
//!
//! A [`TermsEnumRequest`] names an index and a field. The
//! [`TermsEnumCoordinator`] resolves the index to its shards, sends every
//! shard a [`ShardTermsRequest`](crate::shard::ShardTermsRequest), waits for
//! all of them and merges the per-shard lists into one sorted, deduplicated
//! page of terms.

pub mod config;
pub mod coordinator;
pub mod metrics;
pub mod request;
pub mod response;

pub use config::TermsEnumConfig;
pub use coordinator::TermsEnumCoordinator;
pub use metrics::{TermsEnumMetrics, TermsEnumMetricsCollector, Timer};
pub use request::TermsEnumRequest;
pub use response::{ShardFailure, TermsEnumResponse};
