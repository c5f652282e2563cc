//! Bounded worker pool for the fan-out stages
//!
//! Every input runs as its own task; a semaphore caps how many run at once.
//! Results land in the slot of their input index, so output order never
//! depends on completion order. Dropping the pool's `JoinSet` aborts any task
//! still running, which tears the pool down on every exit path.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::{PipelineError, Result};

/// Fixed-capacity pool scoped to one pipeline run
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl WorkerPool {
    /// Pool running at most `capacity` units of work at once (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Run `work` for every input and wait for all of them
    ///
    /// The returned vector is index-aligned with `inputs`. A task that panics
    /// or is cancelled yields `PipelineError::Worker` in its slot.
    pub async fn run_all<I, T, F, Fut>(&self, inputs: Vec<I>, work: F) -> Vec<Result<T>>
    where
        I: Send + 'static,
        T: Send + 'static,
        F: Fn(usize, I) -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let total = inputs.len();
        let mut join_set = JoinSet::new();

        for (index, input) in inputs.into_iter().enumerate() {
            let semaphore = Arc::clone(&self.semaphore);
            let unit = work(index, input);

            join_set.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return (index, Err(PipelineError::Worker("worker pool closed".to_string())))
                    }
                };
                (index, unit.await)
            });
        }

        let mut slots: Vec<Option<Result<T>>> = (0..total).map(|_| None).collect();

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => tracing::error!(error = %e, "Worker task did not complete"),
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| {
                    Err(PipelineError::Worker(format!("work item {} did not complete", index)))
                })
            })
            .collect()
    }
}
