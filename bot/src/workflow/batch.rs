//! Bounded-concurrency batch execution

use std::future::Future;
use std::time::Duration;

use futures::future::join_all;
use tracing::{error, info};

use crate::models::report::BatchOutcome;

/// Runs a task over many URLs, a fixed-size chunk at a time
#[derive(Debug, Clone)]
pub struct BatchLimiter {
    concurrency_limit: usize,
    batch_delay: Duration,
}

impl BatchLimiter {
    pub fn new(concurrency_limit: usize, batch_delay: Duration) -> Self {
        Self {
            concurrency_limit: concurrency_limit.max(1),
            batch_delay,
        }
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// Run `task` for every URL
    ///
    /// Items of a chunk run concurrently and all of them settle before the
    /// next chunk starts. Outcomes come back in submission order; a task that
    /// panics becomes `BatchOutcome::Failed` without affecting its siblings.
    pub async fn run<F, Fut>(&self, urls: Vec<String>, task: F) -> Vec<BatchOutcome>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = BatchOutcome> + Send + 'static,
    {
        let total = urls.len();
        let chunks: Vec<Vec<String>> = urls
            .chunks(self.concurrency_limit)
            .map(|chunk| chunk.to_vec())
            .collect();
        let chunk_count = chunks.len();
        let mut outcomes = Vec::with_capacity(total);

        for (index, chunk) in chunks.into_iter().enumerate() {
            info!(
                "Batch chunk {}/{} ({} targets)",
                index + 1,
                chunk_count,
                chunk.len()
            );

            let handles: Vec<tokio::task::JoinHandle<BatchOutcome>> =
                chunk.iter().map(|url| tokio::spawn(task(url.clone()))).collect();
            let settled = join_all(handles).await;

            for (url, joined) in chunk.into_iter().zip(settled) {
                let outcome = match joined {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        error!("Batch task for {} did not complete: {}", url, e);
                        BatchOutcome::Failed {
                            target: url,
                            error: format!("Task failed: {}", e),
                        }
                    }
                };
                outcomes.push(outcome);
            }

            if index + 1 < chunk_count && !self.batch_delay.is_zero() {
                tokio::time::sleep(self.batch_delay).await;
            }
        }

        outcomes
    }
}
