//! Utility functions and helper types.

use std::future::Future;
use std::time::Duration;
use tokio::task::{AbortHandle, JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// Create a token that cancels itself once `deadline` elapses.
///
/// A zero deadline yields a token that is already cancelled.
pub fn deadline_token(deadline: Duration) -> CancellationToken {
    let token = CancellationToken::new();
    if deadline.is_zero() {
        token.cancel();
        return token;
    }

    let timer = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(deadline) => timer.cancel(),
            // Someone else cancelled first; nothing left to do.
            _ = timer.cancelled() => {}
        }
    });
    token
}

/// Await a stage task, folding a panic or abort into [`Error::TaskFailed`]
pub async fn join_stage<T>(handle: JoinHandle<Result<T>>) -> Result<T> {
    handle.await?
}

/// Aborts every tracked stage task when dropped.
///
/// Aborting a task that already finished is a no-op, so the guard can be
/// held across the happy path and still cover every early return.
#[derive(Debug, Default)]
pub struct StageGuard {
    handles: Vec<AbortHandle>,
}

impl StageGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track the task behind `handle`
    pub fn track<T>(&mut self, handle: &JoinHandle<T>) {
        self.handles.push(handle.abort_handle());
    }

    /// Number of tasks tracked
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl Drop for StageGuard {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

/// Run `future` to completion, or fail with [`Error::Timeout`] after `limit`
pub async fn within<F, T>(limit: Duration, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => Err(Error::timeout(limit.as_millis() as u64)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn zero_deadline_is_precancelled() {
        assert!(deadline_token(Duration::ZERO).is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_fires() {
        let token = deadline_token(Duration::from_millis(50));
        assert!(!token.is_cancelled());
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn join_stage_reports_panics() {
        let handle = tokio::spawn(async {
            if true {
                panic!("boom");
            }
            Ok::<(), Error>(())
        });
        let result: Result<()> = join_stage(handle).await;
        assert!(matches!(result, Err(Error::TaskFailed(_))));
    }

    #[tokio::test]
    async fn guard_aborts_tracked_tasks() {
        let handle = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<(), Error>(())
        });

        let mut guard = StageGuard::new();
        assert!(guard.is_empty());
        guard.track(&handle);
        assert_eq!(guard.len(), 1);
        drop(guard);

        let err = handle.await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn within_times_out() {
        let result = within(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok::<(), Error>(())
        })
        .await;
        assert!(matches!(result, Err(Error::Timeout { duration_ms: 10 })));
    }
}
