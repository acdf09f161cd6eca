//! Metrics collection for terms enumeration calls.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;

/// Snapshot of the metrics collected so far.
#[derive(Debug, Clone, Serialize)]
pub struct TermsEnumMetrics {
    /// Calls executed, successful or not.
    pub total_calls: u64,

    /// Calls that returned a response.
    pub successful_calls: u64,

    /// Calls that returned an error.
    pub failed_calls: u64,

    /// Calls that hit their deadline.
    pub timeout_count: u64,

    /// Shard requests dispatched.
    pub shard_requests: u64,

    /// Shard requests that failed or timed out.
    pub shard_failures: u64,

    /// Terms returned to callers.
    pub terms_returned: u64,

    /// Average call duration.
    pub avg_call_time: Duration,

    /// Longest call observed.
    pub max_call_time: Duration,

    /// Shortest call observed.
    pub min_call_time: Duration,
}

/// Outcome of one call, as fed to the collector.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallRecord {
    /// Wall time.
    pub duration: Duration,
    /// Whether a response was returned.
    pub success: bool,
    /// Whether the deadline passed.
    pub timed_out: bool,
    /// Shards dispatched to.
    pub shards: u64,
    /// Dispatched shards that failed or did not reply in time.
    pub failed_shards: u64,
    /// Terms in the response.
    pub terms: u64,
}

/// Lock-free collector shared by concurrent calls.
#[derive(Debug)]
pub struct TermsEnumMetricsCollector {
    total_calls: AtomicU64,
    successful_calls: AtomicU64,
    failed_calls: AtomicU64,
    timeout_count: AtomicU64,
    shard_requests: AtomicU64,
    shard_failures: AtomicU64,
    terms_returned: AtomicU64,
    total_nanos: AtomicU64,
    max_nanos: AtomicU64,
    min_nanos: AtomicU64,
}

impl TermsEnumMetricsCollector {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self {
            total_calls: AtomicU64::new(0),
            successful_calls: AtomicU64::new(0),
            failed_calls: AtomicU64::new(0),
            timeout_count: AtomicU64::new(0),
            shard_requests: AtomicU64::new(0),
            shard_failures: AtomicU64::new(0),
            terms_returned: AtomicU64::new(0),
            total_nanos: AtomicU64::new(0),
            max_nanos: AtomicU64::new(0),
            min_nanos: AtomicU64::new(u64::MAX),
        }
    }

    /// Record one call.
    pub fn record_call(&self, record: CallRecord) {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        if record.success {
            self.successful_calls.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_calls.fetch_add(1, Ordering::Relaxed);
        }
        if record.timed_out {
            self.timeout_count.fetch_add(1, Ordering::Relaxed);
        }
        self.shard_requests.fetch_add(record.shards, Ordering::Relaxed);
        self.shard_failures
            .fetch_add(record.failed_shards, Ordering::Relaxed);
        self.terms_returned.fetch_add(record.terms, Ordering::Relaxed);

        let nanos = u64::try_from(record.duration.as_nanos()).unwrap_or(u64::MAX);
        self.total_nanos.fetch_add(nanos, Ordering::Relaxed);
        self.max_nanos.fetch_max(nanos, Ordering::Relaxed);
        self.min_nanos.fetch_min(nanos, Ordering::Relaxed);
    }

    /// Get the current metrics snapshot.
    pub fn snapshot(&self) -> TermsEnumMetrics {
        let total_calls = self.total_calls.load(Ordering::Relaxed);
        let total_nanos = self.total_nanos.load(Ordering::Relaxed);
        let avg_nanos = if total_calls > 0 {
            total_nanos / total_calls
        } else {
            0
        };

        let min_nanos = self.min_nanos.load(Ordering::Relaxed);
        let min_call_time = if min_nanos == u64::MAX {
            Duration::ZERO
        } else {
            Duration::from_nanos(min_nanos)
        };

        TermsEnumMetrics {
            total_calls,
            successful_calls: self.successful_calls.load(Ordering::Relaxed),
            failed_calls: self.failed_calls.load(Ordering::Relaxed),
            timeout_count: self.timeout_count.load(Ordering::Relaxed),
            shard_requests: self.shard_requests.load(Ordering::Relaxed),
            shard_failures: self.shard_failures.load(Ordering::Relaxed),
            terms_returned: self.terms_returned.load(Ordering::Relaxed),
            avg_call_time: Duration::from_nanos(avg_nanos),
            max_call_time: Duration::from_nanos(self.max_nanos.load(Ordering::Relaxed)),
            min_call_time,
        }
    }

    /// Reset all metrics.
    pub fn reset(&self) {
        for counter in [
            &self.total_calls,
            &self.successful_calls,
            &self.failed_calls,
            &self.timeout_count,
            &self.shard_requests,
            &self.shard_failures,
            &self.terms_returned,
            &self.total_nanos,
            &self.max_nanos,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
        self.min_nanos.store(u64::MAX, Ordering::Relaxed);
    }
}

impl Default for TermsEnumMetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper for timing operations.
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Start time, for deriving deadlines.
    pub fn started_at(&self) -> Instant {
        self.start
    }

    /// Get elapsed time.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(millis: u64, success: bool, timed_out: bool) -> CallRecord {
        CallRecord {
            duration: Duration::from_millis(millis),
            success,
            timed_out,
            shards: 3,
            failed_shards: u64::from(!success),
            terms: if success { 10 } else { 0 },
        }
    }

    #[test]
    fn test_metrics_collection() {
        let collector = TermsEnumMetricsCollector::new();
        collector.record_call(call(100, true, false));
        collector.record_call(call(50, true, false));
        collector.record_call(call(200, false, true));

        let metrics = collector.snapshot();
        assert_eq!(metrics.total_calls, 3);
        assert_eq!(metrics.successful_calls, 2);
        assert_eq!(metrics.failed_calls, 1);
        assert_eq!(metrics.timeout_count, 1);
        assert_eq!(metrics.shard_requests, 9);
        assert_eq!(metrics.shard_failures, 1);
        assert_eq!(metrics.terms_returned, 20);
        assert_eq!(metrics.min_call_time, Duration::from_millis(50));
        assert_eq!(metrics.max_call_time, Duration::from_millis(200));
        assert!(metrics.avg_call_time >= Duration::from_millis(100));
        assert!(metrics.avg_call_time <= Duration::from_millis(120));
    }

    #[test]
    fn test_reset() {
        let collector = TermsEnumMetricsCollector::new();
        collector.record_call(call(10, true, false));
        collector.reset();

        let metrics = collector.snapshot();
        assert_eq!(metrics.total_calls, 0);
        assert_eq!(metrics.min_call_time, Duration::ZERO);
        assert_eq!(metrics.max_call_time, Duration::ZERO);
    }

    #[test]
    fn test_timer() {
        let timer = Timer::start();
        std::thread::sleep(Duration::from_millis(10));
        assert!(timer.elapsed() >= Duration::from_millis(10));
        assert!(timer.started_at() <= Instant::now());
    }
}
