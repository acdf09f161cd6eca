//! Delivery of shard requests to the nodes holding the shards.

use std::sync::Arc;

use ahash::AHashMap;
use futures::FutureExt;
use futures::future::{self, BoxFuture};
use parking_lot::RwLock;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tokio::sync::oneshot;
use tracing::{debug, error};

use crate::error::{Result, TermwalkError};
use crate::shard::response::{ShardTermsRequest, ShardTermsResponse, execute_on_shard};
use crate::shard::store::{Shard, ShardId};

/// Sends a shard request to a node and resolves with the shard's reply.
///
/// Every returned future must eventually resolve, successfully or with an
/// error; the coordinator waits for all of them.
pub trait ShardTransport: Send + Sync {
    /// Send `request` to `node_id`.
    fn send(
        &self,
        node_id: &str,
        request: ShardTermsRequest,
    ) -> BoxFuture<'static, Result<ShardTermsResponse>>;
}

/// In-process transport: each registered node serves its shards from a
/// shared worker pool.
pub struct LocalTransport {
    nodes: RwLock<AHashMap<String, AHashMap<ShardId, Arc<Shard>>>>,
    thread_pool: Arc<ThreadPool>,
}

impl LocalTransport {
    /// Create a transport with `thread_pool_size` workers (CPU count if `None`).
    pub fn new(thread_pool_size: Option<usize>) -> Result<Self> {
        let num_threads = thread_pool_size.unwrap_or_else(num_cpus::get);
        let thread_pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("shard-terms-{i}"))
            .panic_handler(|_| error!("shard terms task panicked"))
            .build()
            .map_err(|e| TermwalkError::internal(format!("Failed to create thread pool: {e}")))?;

        Ok(LocalTransport {
            nodes: RwLock::new(AHashMap::new()),
            thread_pool: Arc::new(thread_pool),
        })
    }

    /// Make `node_id` serve `shard`.
    pub fn add_shard(&self, node_id: &str, shard: Shard) {
        let mut nodes = self.nodes.write();
        nodes
            .entry(node_id.to_string())
            .or_default()
            .insert(shard.id().clone(), Arc::new(shard));
    }

    /// Stop serving a shard on a node.
    pub fn remove_shard(&self, node_id: &str, shard_id: &ShardId) -> bool {
        let mut nodes = self.nodes.write();
        nodes
            .get_mut(node_id)
            .and_then(|shards| shards.remove(shard_id))
            .is_some()
    }

    /// Number of shards served by a node.
    pub fn shard_count(&self, node_id: &str) -> usize {
        self.nodes.read().get(node_id).map_or(0, |shards| shards.len())
    }

    fn lookup(&self, node_id: &str, shard_id: &ShardId) -> Result<Arc<Shard>> {
        let nodes = self.nodes.read();
        let shards = nodes
            .get(node_id)
            .ok_or_else(|| TermwalkError::transport(format!("node [{node_id}] is not connected")))?;
        shards.get(shard_id).cloned().ok_or_else(|| {
            TermwalkError::shard(format!("shard {shard_id} is not allocated on node [{node_id}]"))
        })
    }
}

impl ShardTransport for LocalTransport {
    fn send(
        &self,
        node_id: &str,
        request: ShardTermsRequest,
    ) -> BoxFuture<'static, Result<ShardTermsResponse>> {
        let shard = match self.lookup(node_id, &request.shard_id) {
            Ok(shard) => shard,
            Err(e) => return future::ready(Err(e)).boxed(),
        };

        let (tx, rx) = oneshot::channel();
        let shard_id = request.shard_id.clone();
        debug!(shard = %shard_id, node = node_id, "dispatching shard terms request");

        self.thread_pool.spawn(move || {
            let reply = execute_on_shard(&shard, &request).and_then(|response| response.encode());
            let _ = tx.send(reply);
        });

        async move {
            let bytes = rx.await.map_err(|_| {
                TermwalkError::shard(format!("shard {shard_id} dropped the request without replying"))
            })??;
            ShardTermsResponse::decode(&bytes)
        }
        .boxed()
    }
}
