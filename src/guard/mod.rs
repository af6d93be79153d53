//! Per-question concurrency guard.
//!
//! Each question gets its own `tokio::sync::Mutex`, created on first use and
//! dropped again once nobody holds or awaits it. Acquisition waits at most the
//! configured timeout. A [`QuestionLease`] releases the lock when dropped, so
//! the critical section ends on every exit path, including errors, panics and
//! cancelled futures.

use crate::core::QuestionId;
use crate::error::WorkflowError;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockTable = Arc<Mutex<HashMap<QuestionId, Arc<AsyncMutex<()>>>>>;

/// Exclusive hold on one question's critical section.
#[derive(Debug)]
pub struct QuestionLease {
    question_id: QuestionId,
    guard: Option<OwnedMutexGuard<()>>,
    table: LockTable,
}

impl QuestionLease {
    pub fn question_id(&self) -> QuestionId {
        self.question_id
    }
}

impl Drop for QuestionLease {
    fn drop(&mut self) {
        // Release before pruning so the entry's count reflects only waiters.
        self.guard.take();
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = table.get(&self.question_id) {
            if Arc::strong_count(entry) == 1 {
                table.remove(&self.question_id);
            }
        }
        tracing::debug!(question_id = %self.question_id, "Question lock released");
    }
}

/// Serializes critical sections per question.
#[derive(Clone, Debug)]
pub struct ConcurrencyGuard {
    table: LockTable,
    timeout: Duration,
}

impl ConcurrencyGuard {
    pub fn new(timeout: Duration) -> Self {
        Self {
            table: Arc::new(Mutex::new(HashMap::new())),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Questions with a live lock entry (held or awaited).
    pub fn active(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn entry(&self, question_id: QuestionId) -> Arc<AsyncMutex<()>> {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(table.entry(question_id).or_default())
    }

    /// Wait up to the configured timeout for the question's lock.
    pub async fn acquire(&self, question_id: QuestionId) -> Result<QuestionLease, WorkflowError> {
        let mutex = self.entry(question_id);
        // lock_owned consumes this clone; on timeout it is dropped with the future.
        match tokio::time::timeout(self.timeout, mutex.lock_owned()).await {
            Ok(guard) => {
                tracing::debug!(question_id = %question_id, "Question lock acquired");
                Ok(QuestionLease {
                    question_id,
                    guard: Some(guard),
                    table: Arc::clone(&self.table),
                })
            }
            Err(_) => {
                tracing::warn!(
                    question_id = %question_id,
                    timeout = ?self.timeout,
                    "Timed out waiting for question lock",
                );
                self.prune(question_id);
                Err(WorkflowError::LockTimeout {
                    question_id,
                    waited: self.timeout,
                })
            }
        }
    }

    fn prune(&self, question_id: QuestionId) {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = table.get(&question_id) {
            if Arc::strong_count(entry) == 1 {
                table.remove(&question_id);
            }
        }
    }

    /// Run `f` inside the question's critical section.
    pub async fn with_lock<F, Fut, T>(&self, question_id: QuestionId, f: F) -> Result<T, WorkflowError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, WorkflowError>>,
    {
        let _lease = self.acquire(question_id).await?;
        f().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn lease_excludes_second_acquirer_until_dropped() {
        let guard = ConcurrencyGuard::new(Duration::from_millis(20));
        let id = QuestionId::new();

        let lease = guard.acquire(id).await.unwrap();
        assert_eq!(lease.question_id(), id);

        let err = guard.acquire(id).await.unwrap_err();
        assert!(matches!(err, WorkflowError::LockTimeout { question_id, .. } if question_id == id));
        assert!(err.is_retryable());

        drop(lease);
        assert!(guard.acquire(id).await.is_ok());
    }

    #[tokio::test]
    async fn sub_millisecond_timeout_is_reported_exactly() {
        let wait = Duration::from_micros(750);
        let guard = ConcurrencyGuard::new(wait);
        let id = QuestionId::new();
        let _lease = guard.acquire(id).await.unwrap();

        let err = guard.acquire(id).await.unwrap_err();
        assert_eq!(err, WorkflowError::LockTimeout { question_id: id, waited: wait });
    }

    #[tokio::test]
    async fn different_questions_never_contend() {
        let guard = ConcurrencyGuard::new(Duration::from_millis(20));
        let _a = guard.acquire(QuestionId::new()).await.unwrap();
        let _b = guard.acquire(QuestionId::new()).await.unwrap();
        assert_eq!(guard.active(), 2);
    }

    #[tokio::test]
    async fn idle_entries_are_pruned() {
        let guard = ConcurrencyGuard::new(Duration::from_millis(20));
        let id = QuestionId::new();
        {
            let _lease = guard.acquire(id).await.unwrap();
            assert_eq!(guard.active(), 1);
        }
        assert_eq!(guard.active(), 0);

        let lease = guard.acquire(id).await.unwrap();
        let _ = guard.acquire(id).await;
        drop(lease);
        assert_eq!(guard.active(), 0);
    }

    #[tokio::test]
    async fn with_lock_releases_on_error() {
        let guard = ConcurrencyGuard::new(Duration::from_millis(20));
        let id = QuestionId::new();

        let result: Result<(), _> = guard
            .with_lock(id, || async { Err(WorkflowError::QuestionNotFound(id)) })
            .await;
        assert_eq!(result, Err(WorkflowError::QuestionNotFound(id)));
        assert!(guard.acquire(id).await.is_ok());
    }

    #[tokio::test]
    async fn critical_sections_do_not_overlap() {
        let guard = ConcurrencyGuard::new(Duration::from_secs(5));
        let id = QuestionId::new();
        let inside = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let guard = guard.clone();
                let inside = Arc::clone(&inside);
                let max_seen = Arc::clone(&max_seen);
                tokio::spawn(async move {
                    guard
                        .with_lock(id, || async {
                            let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                            max_seen.fetch_max(now, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(2)).await;
                            inside.fetch_sub(1, Ordering::SeqCst);
                            Ok(())
                        })
                        .await
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert_eq!(guard.active(), 0);
    }

    #[tokio::test]
    async fn cancelled_waiter_leaves_no_lease_behind() {
        let guard = ConcurrencyGuard::new(Duration::from_secs(5));
        let id = QuestionId::new();
        let lease = guard.acquire(id).await.unwrap();

        let waiter = {
            let guard = guard.clone();
            tokio::spawn(async move { guard.acquire(id).await.map(|_| ()) })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;
        waiter.abort();
        let _ = waiter.await;

        drop(lease);
        assert_eq!(guard.active(), 0);
        assert!(guard.acquire(id).await.is_ok());
    }
}
