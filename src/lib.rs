//! # Termwalk
//!
//! Sorted, deduplicated enumeration of the terms of a field across every
//! shard of an index.
//!
//! ## Features
//!
//! - Immutable on-disk term segments with per-term document frequencies
//! - K-way merge of segment term sources with frequency filtering
//! - Shard routing with `_local`, `_primary` and custom preferences
//! - Concurrent fan-out with timeouts and partial results
//! - Cursor-based pagination

pub mod cli;
pub mod cluster;
pub mod error;
pub mod lexical;
pub mod shard;
pub mod term;
pub mod terms_enum;

pub mod prelude {
    pub use crate::cluster::{ClusterService, ClusterState, LocalTransport, Preference};
    pub use crate::error::{Result, TermwalkError};
    pub use crate::shard::{Shard, ShardId};
    pub use crate::term::Term;
    pub use crate::terms_enum::{TermsEnumConfig, TermsEnumCoordinator, TermsEnumRequest, TermsEnumResponse};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
