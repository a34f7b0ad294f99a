use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::Semaphore;

use crate::config::CacheConfig;
use crate::error::{CacheContents, CacheError};
use crate::slot::Slot;

/// A bounded pool for background lookup execution.
///
/// Submitted tasks run on the tokio runtime, with at most the configured
/// number executing at any one time. Submission itself never suspends the
/// caller: the concurrency permit is acquired inside the spawned task, so a
/// full pool delays execution, not submission.
///
/// The pool is externally supplied to
/// [`Store::populate_async`](crate::Store::populate_async); its sizing and
/// lifetime belong to the owning context, not to any one cache.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
}

impl WorkerPool {
    /// Creates a pool running at most `max_workers` tasks concurrently.
    ///
    /// The value is clamped to a minimum of 1, as a pool without any permits
    /// would never run anything and every handle forced against it would
    /// suspend forever.
    pub fn new(max_workers: usize) -> Self {
        WorkerPool {
            permits: Arc::new(Semaphore::new(max_workers.max(1))),
        }
    }

    /// Creates a pool sized from the configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_workers)
    }

    /// Spawns `task` onto the pool, returning a handle representing the
    /// produced value.
    ///
    /// The [`SpawnHandle`] returned is a proxy for the task itself: when the
    /// task completes on this pool, the handle resolves to its captured
    /// result. A task that panics resolves the handle to
    /// [`CacheError::InternalError`].
    pub fn spawn<V, F>(&self, task: F) -> SpawnHandle<V>
    where
        V: Clone + Send + Sync + 'static,
        F: Future<Output = CacheContents<V>> + Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        let join = tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                // The semaphore is never closed while a pool handle is alive,
                // so this only fires when the owning context is tearing down.
                Err(_) => return Err(CacheError::InternalError),
            };
            task.await
        });

        SpawnHandle(SpawnHandleInner::Task(Slot::new(async move {
            match join.await {
                Ok(contents) => contents,
                Err(err) => {
                    tracing::error!(
                        error = &err as &dyn std::error::Error,
                        "background lookup task failed",
                    );
                    Err(CacheError::InternalError)
                }
            }
        })))
    }
}

enum SpawnHandleInner<V: Clone> {
    Resolved(CacheContents<V>),
    Task(Slot<V>),
}

impl<V: Clone> Clone for SpawnHandleInner<V> {
    fn clone(&self) -> Self {
        match self {
            Self::Resolved(contents) => Self::Resolved(contents.clone()),
            Self::Task(slot) => Self::Task(slot.clone()),
        }
    }
}

impl<V: Clone> fmt::Debug for SpawnHandleInner<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved(_) => write!(f, "SpawnHandle::Resolved(..)"),
            Self::Task(_) => write!(f, "SpawnHandle::Task(..)"),
        }
    }
}

/// Handle returned from [`WorkerPool::spawn`] and
/// [`Store::populate_async`](crate::Store::populate_async).
///
/// Unlike a [`Slot`], a handle is not installed into any store. It is bound
/// to one background task (or holds an already-resolved result) and memoizes
/// that task's outcome: forcing suspends until the task completes, and once
/// resolved every force returns the same captured result.
pub struct SpawnHandle<V: Clone>(SpawnHandleInner<V>);

impl<V: Clone> Clone for SpawnHandle<V> {
    fn clone(&self) -> Self {
        SpawnHandle(self.0.clone())
    }
}

impl<V: Clone> fmt::Debug for SpawnHandle<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<V> SpawnHandle<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates a handle that already carries its result.
    ///
    /// Used for keys whose store entry is resolved: forcing never suspends
    /// and no background task exists.
    pub(crate) fn resolved(contents: CacheContents<V>) -> Self {
        SpawnHandle(SpawnHandleInner::Resolved(contents))
    }

    /// Forces the handle, suspending until the underlying task has completed.
    ///
    /// The captured result is the same for every force; a captured failure is
    /// rethrown by propagating the returned `Err` with `?`.
    pub async fn force(&self) -> CacheContents<V> {
        match &self.0 {
            SpawnHandleInner::Resolved(contents) => contents.clone(),
            SpawnHandleInner::Task(slot) => slot.force().await,
        }
    }

    /// Returns the captured result if the task has completed, without
    /// suspending.
    ///
    /// The work itself runs in the background task either way, so checking a
    /// pending handle triggers nothing.
    pub fn peek(&self) -> Option<CacheContents<V>> {
        match &self.0 {
            SpawnHandleInner::Resolved(contents) => Some(contents.clone()),
            // A single poll of the join wrapper; the task is not awaited.
            SpawnHandleInner::Task(slot) => slot.peek().or_else(|| slot.force().now_or_never()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_bounded_concurrency() {
        let pool = WorkerPool::new(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let running = Arc::clone(&running);
                let peak = Arc::clone(&peak);
                pool.spawn(async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    Ok(i)
                })
            })
            .collect();

        for (i, handle) in handles.iter().enumerate() {
            assert_eq!(handle.force().await, Ok(i));
        }
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_repeated_forces_return_same_value() {
        let pool = WorkerPool::new(4);
        let calls = Arc::new(AtomicUsize::new(0));
        let handle = pool.spawn({
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok("done".to_string())
            }
        });

        assert_eq!(handle.force().await, Ok("done".to_string()));
        assert_eq!(handle.force().await, Ok("done".to_string()));
        assert_eq!(handle.clone().force().await, Ok("done".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panicking_task_resolves_to_internal_error() {
        let pool = WorkerPool::new(1);
        let handle: SpawnHandle<i32> = pool.spawn(async { panic!("kaboom") });

        assert_eq!(handle.force().await, Err(CacheError::InternalError));
        // The failure is captured, not rethrown as a panic.
        assert_eq!(handle.peek(), Some(Err(CacheError::InternalError)));
    }

    #[tokio::test]
    async fn test_zero_sized_pool_still_runs() {
        let pool = WorkerPool::new(0);
        let handle = pool.spawn(async { Ok(1) });
        assert_eq!(handle.force().await, Ok(1));
    }
}
