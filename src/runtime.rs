//! Task submission for blocking work.
//!
//! Both the HTTP handlers and node execution hand downloads to the same pool:
//! handlers `await` the result, nodes block their own thread on it. The pool
//! is tokio's blocking pool behind the handle captured at startup, so no
//! call site ever builds a runtime of its own.

use crate::error::{Error, Result};
use tokio::runtime::Handle;

#[derive(Debug, Clone)]
pub struct TaskPool {
    handle: Handle,
}

impl TaskPool {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Binds to the runtime the caller is running on.
    pub fn current() -> Result<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| Error::ConfigError(format!("No tokio runtime available: {}", e)))
    }

    /// Runs `f` on the blocking pool and awaits its result.
    pub async fn execute<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        Ok(self.handle.spawn_blocking(f).await?)
    }

    /// Submits `f` and parks the calling thread until it finishes.
    ///
    /// Must not be called from an async task; use it from `spawn_blocking`
    /// or a plain thread.
    pub fn execute_sync<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        self.handle.block_on(self.execute(f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_execute() {
        let pool = TaskPool::current().unwrap();

        let result = pool.execute(|| (0..1000u64).sum::<u64>()).await.unwrap();

        assert_eq!(result, 499500);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_execute_sync_from_blocking_thread() {
        let pool = Arc::new(TaskPool::current().unwrap());

        let pool_clone = pool.clone();
        let result = tokio::task::spawn_blocking(move || {
            pool_clone.execute_sync(|| std::thread::current().id())
        })
        .await
        .unwrap()
        .unwrap();

        assert_ne!(result, std::thread::current().id());
    }

    #[tokio::test]
    async fn test_panic_is_reported() {
        let pool = TaskPool::current().unwrap();

        let result = pool.execute(|| -> u32 { panic!("boom") }).await;

        assert!(matches!(result, Err(Error::TaskFailed(_))));
    }

    #[test]
    fn test_current_without_runtime() {
        assert!(matches!(TaskPool::current(), Err(Error::ConfigError(_))));
    }
}
