//! Cluster-wide pieces: shard resolution, transport and the final merge.

pub mod merger;
pub mod routing;
pub mod transport;

pub use merger::{ClusterTermsMerger, merge_sorted_terms};
pub use routing::{
    ClusterService, ClusterState, Preference, ShardCopy, ShardResolver, ShardRouting, ShardTarget,
};
pub use transport::{LocalTransport, ShardTransport};
