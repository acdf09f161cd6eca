//! Shard-local term enumeration.
//!
//! A shard merges the term sources of all its segments ([`merge`]) and packs
//! the result into a [`response::ShardTermsResponse`] for the coordinator.

pub mod merge;
pub mod response;
pub mod store;

pub use merge::{MergeStats, ShardTermsMerger, merge_shard_terms};
pub use response::{ShardTermsRequest, ShardTermsResponse, execute_on_shard};
pub use store::{Shard, ShardId};
