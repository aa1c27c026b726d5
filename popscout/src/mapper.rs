//! Bounded-concurrency mapping with per-item failure isolation.
//!
//! [`map_with_concurrency`] runs an async, fallible function over every
//! element of a slice with at most `limit` calls in flight. Workers pull
//! indices from one shared atomic cursor, so each index is claimed exactly
//! once, and each worker writes its outcome straight into the output slot of
//! the index it claimed. The output therefore has the input's length and
//! order no matter in which order the calls complete.
//!
//! All workers are futures driven by the caller's task: they interleave at
//! the mapped call's await points and never run in parallel. Claiming an
//! index is a single `fetch_add` with no await inside it.
//!
//! A failing call never stops the batch. Its error is rendered into a
//! [`ResultRecord::Failure`] that keeps the original input, and the worker
//! moves on to the next index.
//!
//! ```rust,ignore
//! let countries = vec!["Norway".to_string(), "Chad".to_string()];
//! let rows = map_with_concurrency(
//!     &countries,
//!     |country, _| async move { source.today_population(&country).await },
//!     DEFAULT_CONCURRENCY,
//! )
//! .await;
//! assert_eq!(rows.len(), countries.len());
//! ```
use futures::future::join_all;
use std::fmt::Display;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, trace, warn};

use crate::metrics::FetchMetrics;
use crate::results::ResultRecord;

/// Worker count used when the caller does not pick one
pub const DEFAULT_CONCURRENCY: NonZeroUsize = match NonZeroUsize::new(8) {
    Some(limit) => limit,
    None => unreachable!(),
};

type Slots<T, R> = Mutex<Vec<Option<ResultRecord<T, R>>>>;

/// Maps every item through `map` with at most `limit` calls in flight.
///
/// `map` receives an owned clone of the item and its index. The returned
/// vector holds exactly one record per item, `result[i]` belonging to
/// `items[i]`.
pub async fn map_with_concurrency<T, R, E, F, Fut>(
    items: &[T],
    map: F,
    limit: NonZeroUsize,
) -> Vec<ResultRecord<T, R>>
where
    T: Clone,
    E: Display,
    F: Fn(T, usize) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    let metrics = FetchMetrics::new();
    let results = map_with_metrics(items, map, limit, &metrics).await;
    metrics.log_stats();
    results
}

/// Same as [`map_with_concurrency`], recording progress into `metrics`.
pub async fn map_with_metrics<T, R, E, F, Fut>(
    items: &[T],
    map: F,
    limit: NonZeroUsize,
    metrics: &FetchMetrics,
) -> Vec<ResultRecord<T, R>>
where
    T: Clone,
    E: Display,
    F: Fn(T, usize) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    let total = items.len();
    if total == 0 {
        debug!("No items to map, returning empty result");
        return Vec::new();
    }

    let worker_count = limit.get().min(total);
    info!("Mapping {} items with {} concurrent workers", total, worker_count);

    let cursor = AtomicUsize::new(0);
    let slots: Slots<T, R> = Mutex::new((0..total).map(|_| None).collect());

    let workers = (0..worker_count)
        .map(|worker| run_worker(worker, items, &map, &cursor, &slots, metrics));
    join_all(workers).await;

    let results: Vec<ResultRecord<T, R>> = slots
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner)
        .into_iter()
        .flatten()
        .collect();
    debug_assert_eq!(results.len(), total, "every index is claimed once");

    info!("Mapping complete: {} records", results.len());
    results
}

async fn run_worker<T, R, E, F, Fut>(
    worker: usize,
    items: &[T],
    map: &F,
    cursor: &AtomicUsize,
    slots: &Slots<T, R>,
    metrics: &FetchMetrics,
) where
    T: Clone,
    E: Display,
    F: Fn(T, usize) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    metrics.record_worker_started();

    loop {
        let index = cursor.fetch_add(1, Ordering::SeqCst);
        let Some(item) = items.get(index) else {
            break;
        };
        metrics.record_claim(index);
        trace!("Worker {} claimed index {}", worker, index);

        let record = match map(item.clone(), index).await {
            Ok(value) => {
                metrics.record_success();
                ResultRecord::success(value)
            }
            Err(err) => {
                let message = err.to_string();
                warn!("Item {} failed: {}", index, message);
                metrics.record_failure();
                ResultRecord::failure(item.clone(), message)
            }
        };

        let mut guard = slots.lock().unwrap_or_else(PoisonError::into_inner);
        guard[index] = Some(record);
    }

    trace!("Worker {} found the cursor exhausted", worker);
}
