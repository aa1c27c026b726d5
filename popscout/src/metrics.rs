use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Tracks progress of a bounded-concurrency batch.
///
/// Cloning shares the same counters, so a clone can be handed to every
/// worker and read back by the caller once the batch is done.
#[derive(Debug, Clone)]
pub struct FetchMetrics {
    // Claim bookkeeping
    claimed: Arc<AtomicU64>,
    in_flight: Arc<AtomicU64>,
    peak_in_flight: Arc<AtomicU64>,

    // Outcomes
    succeeded: Arc<AtomicU64>,
    failed: Arc<AtomicU64>,

    workers_started: Arc<AtomicU64>,
}

impl FetchMetrics {
    /// Creates a new FetchMetrics instance
    pub fn new() -> Self {
        Self {
            claimed: Arc::new(AtomicU64::new(0)),
            in_flight: Arc::new(AtomicU64::new(0)),
            peak_in_flight: Arc::new(AtomicU64::new(0)),
            succeeded: Arc::new(AtomicU64::new(0)),
            failed: Arc::new(AtomicU64::new(0)),
            workers_started: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Records a worker joining the batch
    pub fn record_worker_started(&self) {
        self.workers_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Records that an index was claimed and its call is now in flight
    pub fn record_claim(&self, index: usize) {
        self.claimed.fetch_add(1, Ordering::Relaxed);
        let current = self.in_flight.fetch_add(1, Ordering::Relaxed) + 1;
        let mut peak = self.peak_in_flight.load(Ordering::Relaxed);
        while current > peak {
            match self.peak_in_flight.compare_exchange_weak(
                peak,
                current,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => peak = actual,
            }
        }
        debug!("Claimed index {}, {} call(s) in flight", index, current);
    }

    /// Records a call that produced a value
    pub fn record_success(&self) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }

    /// Records a call that was turned into an error sentinel
    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }

    /// Gets the current counters
    pub fn get_stats(&self) -> FetchStats {
        FetchStats {
            claimed: self.claimed.load(Ordering::Relaxed),
            in_flight: self.in_flight.load(Ordering::Relaxed),
            peak_in_flight: self.peak_in_flight.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            workers_started: self.workers_started.load(Ordering::Relaxed),
        }
    }

    /// Logs the current counters
    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Batch stats:\n\
             Workers started: {}\n\
             Items claimed: {}\n\
             Succeeded/failed: {}/{}\n\
             Peak in flight: {}",
            stats.workers_started,
            stats.claimed,
            stats.succeeded,
            stats.failed,
            stats.peak_in_flight
        );
    }
}

impl Default for FetchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of [`FetchMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchStats {
    pub claimed: u64,
    pub in_flight: u64,
    pub peak_in_flight: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub workers_started: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_tracking() {
        let metrics = FetchMetrics::new();

        metrics.record_claim(0);
        metrics.record_claim(1);
        let stats = metrics.get_stats();
        assert_eq!(stats.claimed, 2);
        assert_eq!(stats.in_flight, 2);
        assert_eq!(stats.peak_in_flight, 2);

        metrics.record_success();
        let stats = metrics.get_stats();
        assert_eq!(stats.in_flight, 1);
        assert_eq!(stats.peak_in_flight, 2); // Peak should remain unchanged
    }

    #[test]
    fn test_outcome_tracking() {
        let metrics = FetchMetrics::new();

        metrics.record_claim(0);
        metrics.record_success();
        metrics.record_claim(1);
        metrics.record_failure();
        metrics.record_claim(2);
        metrics.record_success();

        let stats = metrics.get_stats();
        assert_eq!(stats.claimed, 3);
        assert_eq!(stats.succeeded, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.in_flight, 0);
        assert_eq!(stats.peak_in_flight, 1);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = FetchMetrics::new();
        let worker_view = metrics.clone();

        worker_view.record_worker_started();
        worker_view.record_claim(7);
        worker_view.record_failure();

        let stats = metrics.get_stats();
        assert_eq!(stats.workers_started, 1);
        assert_eq!(stats.claimed, 1);
        assert_eq!(stats.failed, 1);
    }
}
