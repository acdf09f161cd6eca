//! Fan-out of a terms enumeration request to every shard of an index.

use std::sync::Arc;

use futures::FutureExt;
use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, warn};

use crate::cluster::merger::ClusterTermsMerger;
use crate::cluster::routing::ShardResolver;
use crate::cluster::transport::ShardTransport;
use crate::error::{Result, TermwalkError};
use crate::shard::response::ShardTermsResponse;
use crate::terms_enum::config::TermsEnumConfig;
use crate::terms_enum::metrics::{CallRecord, TermsEnumMetrics, TermsEnumMetricsCollector, Timer};
use crate::terms_enum::request::TermsEnumRequest;
use crate::terms_enum::response::{ShardFailure, TermsEnumResponse};

/// Coordinates terms enumeration across the shards of an index.
pub struct TermsEnumCoordinator {
    /// Configuration for the coordinator.
    config: TermsEnumConfig,

    /// Maps an index to the shards to query.
    resolver: Arc<dyn ShardResolver>,

    /// Delivers shard requests.
    transport: Arc<dyn ShardTransport>,

    /// Metrics collector.
    metrics: Arc<TermsEnumMetricsCollector>,
}

impl TermsEnumCoordinator {
    /// Create a coordinator.
    pub fn new(
        config: TermsEnumConfig,
        resolver: Arc<dyn ShardResolver>,
        transport: Arc<dyn ShardTransport>,
    ) -> Self {
        TermsEnumCoordinator {
            config,
            resolver,
            transport,
            metrics: Arc::new(TermsEnumMetricsCollector::new()),
        }
    }

    /// The coordinator configuration.
    pub fn config(&self) -> &TermsEnumConfig {
        &self.config
    }

    /// Snapshot of the collected metrics.
    pub fn metrics(&self) -> TermsEnumMetrics {
        self.metrics.snapshot()
    }

    /// Enumerate the terms of a field across every shard of an index.
    ///
    /// Shards that fail contribute nothing and are listed in the response;
    /// the call itself only fails on validation, resolution, timeout
    /// (unless partial results are allowed) or when no shard replied.
    pub async fn execute(&self, request: TermsEnumRequest) -> Result<TermsEnumResponse> {
        let timer = Timer::start();
        let mut record = CallRecord::default();
        let result = self.run(&request, &timer, &mut record).await;

        if self.config.enable_metrics {
            record.duration = timer.elapsed();
            if let Ok(response) = &result {
                record.success = true;
                record.terms = response.terms.len() as u64;
            }
            self.metrics.record_call(record);
        }

        result
    }

    /// Runs one call. `record` tracks the shards actually dispatched to and
    /// how many of those failed, whichever way the call ends.
    async fn run(
        &self,
        request: &TermsEnumRequest,
        timer: &Timer,
        record: &mut CallRecord,
    ) -> Result<TermsEnumResponse> {
        request.validate(&self.config)?;
        let targets = self
            .resolver
            .resolve(&request.index, request.preference.as_ref())?;

        let size = request.effective_size(&self.config);
        let timeout = request.effective_timeout(&self.config);
        // A timeout too large to add to the start instant means no deadline.
        let deadline = timer
            .started_at()
            .checked_add(timeout)
            .map(tokio::time::Instant::from_std);
        let total_shards = targets.len();

        let mut settled = vec![false; total_shards];
        let mut failures: Vec<(usize, ShardFailure)> = Vec::new();
        let mut pending = FuturesUnordered::new();

        for (slot, target) in targets.iter().enumerate() {
            match &target.node_id {
                Some(node_id) => {
                    let shard_request = request.shard_request(target.shard_id.clone(), &self.config);
                    let reply = self.transport.send(node_id, shard_request);
                    pending.push(reply.map(move |result| (slot, result)));
                }
                None => {
                    warn!(shard = %target.shard_id, "no active copy to query");
                    settled[slot] = true;
                    failures.push((
                        slot,
                        ShardFailure::new(target.shard_id.clone(), "no active shard copy"),
                    ));
                }
            }
        }
        record.shards = pending.len() as u64;
        debug!(
            index = %request.index,
            shards = total_shards,
            dispatched = pending.len(),
            "dispatched shard terms requests"
        );

        let mut responses: Vec<ShardTermsResponse> = Vec::with_capacity(total_shards);
        let mut timed_out = false;
        loop {
            let next = match deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, pending.next()).await,
                None => Ok(pending.next().await),
            };
            match next {
                Ok(Some((slot, Ok(response)))) => {
                    settled[slot] = true;
                    debug!(shard = %targets[slot].shard_id, terms = response.len(), "shard replied");
                    responses.push(response);
                }
                Ok(Some((slot, Err(e)))) => {
                    settled[slot] = true;
                    record.failed_shards += 1;
                    warn!(shard = %targets[slot].shard_id, error = %e, "shard terms request failed");
                    failures.push((slot, ShardFailure::new(targets[slot].shard_id.clone(), e.to_string())));
                }
                Ok(None) => break,
                Err(_) => {
                    timed_out = true;
                    break;
                }
            }
        }
        drop(pending);

        if timed_out {
            let outstanding = settled.iter().filter(|done| !**done).count();
            record.timed_out = true;
            record.failed_shards += outstanding as u64;
            if !self.config.allow_partial_results {
                return Err(TermwalkError::timeout(format!(
                    "{outstanding} of {total_shards} shards did not reply within {timeout:?}"
                )));
            }
            warn!(outstanding, "terms enumeration timed out, returning partial results");
            for (slot, _) in settled.iter().enumerate().filter(|(_, done)| !**done) {
                failures.push((slot, ShardFailure::timed_out(targets[slot].shard_id.clone())));
            }
        }

        if responses.is_empty() {
            let reason = failures
                .first()
                .map(|(_, failure)| failure.reason.clone())
                .unwrap_or_default();
            return Err(TermwalkError::all_shards_failed(format!(
                "all {total_shards} shards failed, first failure: {reason}"
            )));
        }

        failures.sort_by_key(|(slot, _)| *slot);
        let failures: Vec<ShardFailure> = failures.into_iter().map(|(_, failure)| failure).collect();
        let terms = ClusterTermsMerger::new(size).merge(&responses);

        Ok(TermsEnumResponse {
            terms,
            total_shards,
            successful_shards: responses.len(),
            failed_shards: failures.len(),
            failures,
            timed_out,
            took: timer.elapsed(),
        })
    }
}
