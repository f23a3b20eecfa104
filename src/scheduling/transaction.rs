use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use tracing::warn;

use crate::db::DatabaseError;
use crate::scheduling::error::{SchedulingError, SchedulingResult};
use crate::scheduling::store::{SchedulingStore, StoreResult};

/// Opens transactions at the serializable isolation level and decides which
/// of the store's failures are worth replaying.
///
/// Dropping a transaction without committing rolls it back.
#[async_trait]
pub trait TransactionManager: Send + Sync {
    type Tx: SchedulingStore;

    async fn begin_serializable(&self) -> StoreResult<Self::Tx>;

    async fn commit(&self, tx: Self::Tx) -> StoreResult<()>;

    fn is_retryable(&self, err: &DatabaseError) -> bool {
        err.is_serialization_failure()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step: Duration::from_millis(30),
        }
    }
}

impl RetryPolicy {
    /// Linear backoff: the n-th failed attempt waits `n * backoff_step`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }
}

/// Runs `work` inside a serializable transaction and commits it.
///
/// Retryable storage failures (from the work itself or from the commit)
/// replay the whole transaction until `policy.max_attempts` is reached;
/// the last error is then returned as is. Any other error is returned
/// immediately.
pub async fn run_serializable<M, T, F>(manager: &M, policy: RetryPolicy, mut work: F) -> SchedulingResult<T>
where
    M: TransactionManager,
    T: Send,
    F: for<'t> FnMut(&'t mut M::Tx) -> BoxFuture<'t, SchedulingResult<T>> + Send,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match attempt_once(manager, &mut work).await {
            Err(SchedulingError::Storage(err))
                if attempt < max_attempts && manager.is_retryable(&err) =>
            {
                let delay = policy.backoff(attempt);
                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Serializable transaction aborted, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            outcome => return outcome,
        }
    }
}

async fn attempt_once<M, T, F>(manager: &M, work: &mut F) -> SchedulingResult<T>
where
    M: TransactionManager,
    T: Send,
    F: for<'t> FnMut(&'t mut M::Tx) -> BoxFuture<'t, SchedulingResult<T>> + Send,
{
    let mut tx = manager.begin_serializable().await?;
    let value = work(&mut tx).await?;
    manager.commit(tx).await?;
    Ok(value)
}
