use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::error::{ErrorKind, HarmonizerResult};
use crate::harmonizer_error;
use crate::types::TrialId;

/// How a single unit of pooled work ended.
#[derive(Debug)]
pub enum WorkerResult<T> {
    /// The work finished within its time budget.
    Completed(T),
    /// The time budget expired and the work was dropped.
    TimedOut,
    /// The work panicked. Holds the panic message when it was a string.
    Panicked(String),
}

/// Runs per-identifier futures with at most `max_workers` in flight.
///
/// Each future runs under its own timeout and its own panic guard, so a slow or crashing
/// item never affects its siblings. Submission waits for a free slot, which keeps the
/// number of spawned tasks bounded as well.
#[derive(Debug)]
pub struct WorkerPool<T> {
    semaphore: Arc<Semaphore>,
    timeout: Duration,
    join_set: JoinSet<(TrialId, WorkerResult<T>)>,
    /// Tasks that ended without reporting their identifier.
    lost: usize,
}

impl<T> WorkerPool<T>
where
    T: Send + 'static,
{
    pub fn new(max_workers: usize, timeout: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_workers.max(1))),
            timeout,
            join_set: JoinSet::new(),
            lost: 0,
        }
    }

    /// Spawns `future` for `id` once a worker slot is free.
    pub async fn spawn<F>(&mut self, id: TrialId, future: F) -> HarmonizerResult<()>
    where
        F: Future<Output = T> + Send + 'static,
    {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|err| {
                harmonizer_error!(
                    ErrorKind::InvalidState,
                    "Worker pool was closed",
                    source: err
                )
            })?;

        let timeout = self.timeout;
        self.join_set.spawn(async move {
            let guarded = AssertUnwindSafe(tokio::time::timeout(timeout, future)).catch_unwind();
            let result = match guarded.await {
                Ok(Ok(value)) => WorkerResult::Completed(value),
                Ok(Err(_elapsed)) => WorkerResult::TimedOut,
                Err(payload) => WorkerResult::Panicked(panic_message(payload.as_ref())),
            };
            drop(permit);

            (id, result)
        });

        Ok(())
    }

    /// Waits for every spawned task and returns their results in completion order.
    pub async fn wait_all(mut self) -> PoolResults<T> {
        let mut results = Vec::with_capacity(self.join_set.len());

        while let Some(joined) = self.join_set.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(join_err) => {
                    if join_err.is_cancelled() {
                        debug!("pooled task was cancelled");
                    } else {
                        error!(error = %join_err, "pooled task failed outside its panic guard");
                    }
                    self.lost += 1;
                }
            }
        }

        PoolResults {
            results,
            lost: self.lost,
        }
    }
}

/// Everything a [`WorkerPool`] produced.
#[derive(Debug)]
pub struct PoolResults<T> {
    pub results: Vec<(TrialId, WorkerResult<T>)>,
    /// Tasks whose identifier could not be recovered.
    pub lost: usize,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
