//! Parallel kernel executor.
//!
//! Each phase of a BAA step builds its pool here, runs its chunk tasks, and
//! tears the pool down again; nothing is shared between phases or between
//! iterations. Kernel entry points are synchronous and CPU-bound, so each
//! task runs on the blocking thread pool with a semaphore bounding how many
//! execute at once.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::models::{ConfigError, DelcapError, Result};

/// Run one kernel invocation per task on a pool bounded at `worker_count`
/// concurrent executions, created for this call and torn down with it.
///
/// Results come back in submission order regardless of completion order;
/// callers concatenate or sum them positionally. A single task failure fails
/// the whole call with the lowest-index error and no partial aggregation,
/// but every dispatched task still runs to completion first — there is no
/// cancellation and no retry.
pub async fn dispatch<T, R, F>(worker_count: usize, tasks: Vec<T>, entry: F) -> Result<Vec<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Result<R> + Send + Sync + 'static,
{
    if worker_count == 0 {
        return Err(ConfigError::InvalidWorkerCount(worker_count).into());
    }

    let semaphore = Arc::new(Semaphore::new(worker_count));
    let entry = Arc::new(entry);
    let submitted = tasks.len();

    let mut handles = Vec::with_capacity(submitted);
    for task in tasks {
        let semaphore = Arc::clone(&semaphore);
        let entry = Arc::clone(&entry);
        handles.push(tokio::spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|_| DelcapError::Internal("executor semaphore closed".to_string()))?;
            tokio::task::spawn_blocking(move || entry(task))
                .await
                .map_err(|e| DelcapError::Internal(format!("kernel task panicked: {e}")))?
        }));
    }

    // Await every handle in submission order, which also restores result
    // order after out-of-order completion.
    let mut results = Vec::with_capacity(submitted);
    let mut failure: Option<DelcapError> = None;
    for handle in handles {
        match handle.await {
            Ok(Ok(result)) => results.push(result),
            Ok(Err(e)) => {
                warn!(error = %e, "Chunk task failed");
                if failure.is_none() {
                    failure = Some(e);
                }
            }
            Err(e) => {
                warn!(error = %e, "Chunk task aborted");
                if failure.is_none() {
                    failure = Some(DelcapError::Internal(format!("kernel task aborted: {e}")));
                }
            }
        }
    }

    match failure {
        Some(e) => Err(e),
        None => {
            debug!(tasks = submitted, "All chunk tasks completed");
            Ok(results)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_results_keep_submission_order() {
        // Earlier tasks sleep longer, so completion order is reversed.
        let results = dispatch(4, vec![3u64, 2, 1, 0], |delay| {
            std::thread::sleep(Duration::from_millis(delay * 20));
            Ok(delay)
        })
        .await
        .unwrap();

        assert_eq!(results, vec![3, 2, 1, 0]);
    }

    #[tokio::test]
    async fn test_pool_handles_more_tasks_than_workers() {
        let results = dispatch(2, (0..9usize).collect(), |i| Ok(i * i))
            .await
            .unwrap();
        assert_eq!(results, vec![0, 1, 4, 9, 16, 25, 36, 49, 64]);
    }

    #[tokio::test]
    async fn test_single_failure_fails_the_phase() {
        let err = dispatch(2, vec![0usize, 1, 2], |i| {
            if i == 1 {
                Err(DelcapError::kernel(i, "synthetic failure"))
            } else {
                Ok(i)
            }
        })
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            DelcapError::KernelExecution { chunk: 1, .. }
        ));
    }

    #[tokio::test]
    async fn test_lowest_index_failure_is_reported() {
        let err = dispatch(4, vec![0usize, 1, 2, 3], |i| {
            if i % 2 == 0 {
                Err(DelcapError::kernel(i, "synthetic failure"))
            } else {
                Ok(i)
            }
        })
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            DelcapError::KernelExecution { chunk: 0, .. }
        ));
    }

    #[tokio::test]
    async fn test_zero_workers_rejected() {
        let err = dispatch(0, vec![1usize], Ok).await.unwrap_err();
        assert!(matches!(err, DelcapError::Config(_)));
    }
}
