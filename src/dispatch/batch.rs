//! Batch sharding and partial-failure-tolerant fan-out
//!
//! Work items are split into consecutive batches, every batch is sent at
//! once, and the successful results are concatenated. A failed batch is
//! logged and counted, never returned to the caller.

use crate::config::default_batch_size;
use futures::future::join_all;
use std::fmt::Display;
use std::future::Future;

/// Splits `items` into consecutive batches of at most `batch_size` elements
///
/// Order is preserved within and across batches and every item lands in
/// exactly one batch. A batch size of zero is treated as one.
///
/// # Example
///
/// ```
/// use contact_harvest::partition;
///
/// let items = vec!["a", "b", "c", "d", "e", "f", "g"];
/// let batches = partition(&items, 3);
/// assert_eq!(batches, vec![vec!["a", "b", "c"], vec!["d", "e", "f"], vec!["g"]]);
/// ```
pub fn partition<T: Clone>(items: &[T], batch_size: usize) -> Vec<Vec<T>> {
    items
        .chunks(batch_size.max(1))
        .map(|chunk| chunk.to_vec())
        .collect()
}

/// Aggregate of one dispatch call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Flattened results of every successful batch, in batch order
    ///
    /// Not deduplicated.
    pub items: Vec<String>,

    pub batches: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl DispatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

/// Shards work lists and sends the batches concurrently
#[derive(Debug, Clone, Copy)]
pub struct BatchDispatcher {
    batch_size: usize,
}

impl Default for BatchDispatcher {
    fn default() -> Self {
        Self::new(default_batch_size())
    }
}

impl BatchDispatcher {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Sends every batch of `items` through `send` at the same time
    ///
    /// # Arguments
    ///
    /// * `label` - Name of the downstream action, used in logs
    /// * `items` - Work items to shard
    /// * `send` - Delivers one batch and returns its results
    ///
    /// # Returns
    ///
    /// The concatenated results of the batches that succeeded. Failed
    /// batches contribute nothing and only show up in the counters.
    pub async fn dispatch<F, Fut, E>(&self, label: &str, items: &[String], send: F) -> DispatchOutcome
    where
        F: Fn(Vec<String>) -> Fut,
        Fut: Future<Output = Result<Vec<String>, E>>,
        E: Display,
    {
        let batches = partition(items, self.batch_size);
        let total = batches.len();

        if total == 0 {
            return DispatchOutcome::default();
        }

        tracing::info!(
            "Dispatching {} items to {} in {} batches of up to {}",
            items.len(),
            label,
            total,
            self.batch_size
        );

        let futures = batches.into_iter().enumerate().map(|(index, batch)| {
            let size = batch.len();
            let call = send(batch);
            async move {
                let result = call.await;
                match &result {
                    Ok(found) => tracing::debug!(
                        batch = index + 1,
                        size,
                        results = found.len(),
                        "{} batch succeeded",
                        label
                    ),
                    Err(e) => tracing::warn!(
                        batch = index + 1,
                        size,
                        error = %e,
                        "{} batch failed",
                        label
                    ),
                }
                result
            }
        });

        let mut outcome = DispatchOutcome {
            batches: total,
            ..Default::default()
        };

        for result in join_all(futures).await {
            match result {
                Ok(found) => {
                    outcome.succeeded += 1;
                    outcome.items.extend(found);
                }
                Err(_) => outcome.failed += 1,
            }
        }

        tracing::info!(
            "{}: {}/{} batches succeeded, {} results",
            label,
            outcome.succeeded,
            outcome.batches,
            outcome.items.len()
        );

        outcome
    }
}
