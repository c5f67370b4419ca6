//! Bounded concurrent fan-out over a partition set.
//!
//! One request per partition, run concurrently so end-to-end latency stays
//! independent of partition count, with a concurrency cap to avoid
//! unbounded connections to the underlying stores. Each partition call
//! carries an independent timeout; a timed-out partition is reported as
//! `PartitionUnavailable`, exactly like a failed one. Dropping the overall
//! future cancels any outstanding partition calls.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};

use folio_core::{Error, PartitionSet, PartitionStore, Result};

/// Default cap on concurrent partition requests per fan-out.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Default per-partition call timeout.
pub const DEFAULT_PARTITION_TIMEOUT: Duration = Duration::from_secs(5);

/// Fan-out tuning knobs.
#[derive(Debug, Clone)]
pub struct FanOutConfig {
    /// Maximum number of partition requests in flight at once.
    pub concurrency: usize,
    /// Independent timeout applied to each partition call.
    pub timeout: Duration,
}

impl Default for FanOutConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_PARTITION_TIMEOUT,
        }
    }
}

impl FanOutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Issue `f` against every partition concurrently (bounded by
/// `config.concurrency`) and collect per-partition outcomes.
///
/// Failures are returned, not raised: callers decide whether to isolate
/// (search), skip silently (aggregation), or escalate (all failed).
pub async fn fan_out<T, F, Fut>(
    partitions: &PartitionSet,
    config: &FanOutConfig,
    f: F,
) -> Vec<(String, Result<T>)>
where
    T: Send,
    F: Fn(Arc<dyn PartitionStore>) -> Fut,
    Fut: Future<Output = Result<T>> + Send,
{
    // The futures are built eagerly (still lazy until polled) and boxed so
    // the closure type never leaks into the returned future; the obvious
    // `stream.map(f)` formulation trips rustc's auto-trait leakage bug
    // (rust-lang/rust#110338) when the result is `Send`-checked downstream.
    let calls: Vec<BoxFuture<'_, (String, Result<T>)>> = partitions
        .iter()
        .cloned()
        .map(|store: Arc<dyn PartitionStore>| {
            let category = store.category().to_string();
            let timeout = config.timeout;
            let fut = f(store);
            async move {
                match tokio::time::timeout(timeout, fut).await {
                    Ok(result) => (category, result),
                    Err(_) => {
                        let err = Error::PartitionUnavailable {
                            category: category.clone(),
                            reason: format!("timed out after {}ms", timeout.as_millis()),
                        };
                        (category, Err(err))
                    }
                }
            }
            .boxed()
        })
        .collect();

    stream::iter(calls)
        .buffer_unordered(config.concurrency.max(1))
        .collect()
        .await
}
