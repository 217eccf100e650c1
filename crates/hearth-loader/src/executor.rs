// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded pool for blocking module imports.

use std::sync::Arc;

use hearth_core::HearthError;
use tokio::sync::Semaphore;
use tracing::trace;

/// Runs blocking jobs on tokio's blocking threads, at most `workers` at a time.
#[derive(Clone, Debug)]
pub struct ImportExecutor {
    permits: Arc<Semaphore>,
    workers: usize,
}

impl ImportExecutor {
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            permits: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `job` off the async scheduler once a worker slot is free.
    ///
    /// The slot is held by the blocking task itself, so it stays occupied
    /// until the job returns even if the caller stops waiting.
    pub async fn run<T, F>(&self, job: F) -> Result<T, HearthError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| HearthError::Internal("import pool is closed".into()))?;
        trace!(available = self.permits.available_permits(), "import slot acquired");

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        })
        .await
        .map_err(|e| HearthError::Internal(format!("import task failed: {e}")))
    }
}

impl Default for ImportExecutor {
    fn default() -> Self {
        Self::new(4)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn runs_job_and_returns_value() {
        let executor = ImportExecutor::new(2);
        assert_eq!(executor.run(|| 40 + 2).await.unwrap(), 42);
    }

    #[test]
    fn zero_workers_is_clamped() {
        assert_eq!(ImportExecutor::new(0).workers(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrency_is_bounded() {
        let executor = ImportExecutor::new(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let jobs: Vec<_> = (0..6)
            .map(|_| {
                let executor = executor.clone();
                let running = Arc::clone(&running);
                let peak = Arc::clone(&peak);
                tokio::spawn(async move {
                    executor
                        .run(move || {
                            let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                            peak.fetch_max(now, Ordering::SeqCst);
                            std::thread::sleep(Duration::from_millis(20));
                            running.fetch_sub(1, Ordering::SeqCst);
                        })
                        .await
                })
            })
            .collect();
        for job in jobs {
            job.await.unwrap().unwrap();
        }

        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn panicking_job_surfaces_internal_error() {
        let executor = ImportExecutor::new(1);
        let err = executor.run(|| -> u32 { panic!("boom") }).await.unwrap_err();
        assert!(matches!(err, HearthError::Internal(_)));
        // The slot is released again.
        assert_eq!(executor.run(|| 1).await.unwrap(), 1);
    }
}
