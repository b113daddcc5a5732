use std::fmt;
use std::future::Future;
use std::sync::Arc;

use keeper_common::resilience::policies::AlwaysRetry;
use keeper_common::{RetryConfig, RetryExecutor, RetryOutcome};
use keeper_domain::{KeeperError, KeeperResult};
use tracing::debug;

use super::policy::{ConnectionLossPolicy, SharedRetryPolicy};
use crate::ports::{Connection, ConnectionProvider};

/// Runs connection operations until they succeed or the policy gives up
///
/// Each attempt acquires a fresh connection, so a reconnect in progress
/// surfaces as a failed acquisition and is retried like any other
/// connection fault. Semantic and configuration faults end the loop after
/// the attempt that produced them.
#[derive(Clone)]
pub struct RetryLoop {
    provider: Arc<dyn ConnectionProvider>,
    executor: RetryExecutor<ConnectionLossPolicy<SharedRetryPolicy>>,
}

impl RetryLoop {
    pub fn new(provider: Arc<dyn ConnectionProvider>, config: RetryConfig) -> Self {
        Self::with_policy(provider, config, Arc::new(AlwaysRetry))
    }

    /// Use `policy` to veto or delay retries of connection faults
    pub fn with_policy(
        provider: Arc<dyn ConnectionProvider>,
        config: RetryConfig,
        policy: SharedRetryPolicy,
    ) -> Self {
        Self { provider, executor: RetryExecutor::new(config, ConnectionLossPolicy::new(policy)) }
    }

    pub fn config(&self) -> &RetryConfig {
        self.executor.config()
    }

    /// Run `op` with retry and return its value or the last fault
    pub async fn call_with_retry<T, F, Fut>(&self, op: F) -> KeeperResult<T>
    where
        F: Fn(Arc<dyn Connection>) -> Fut,
        Fut: Future<Output = KeeperResult<T>>,
    {
        self.call_with_outcome(op).await.into_inner()
    }

    /// Like [`RetryLoop::call_with_retry`], keeping attempt statistics
    pub async fn call_with_outcome<T, F, Fut>(&self, op: F) -> RetryOutcome<T, KeeperError>
    where
        F: Fn(Arc<dyn Connection>) -> Fut,
        Fut: Future<Output = KeeperResult<T>>,
    {
        let op = &op;
        let provider = &self.provider;
        let outcome = self
            .executor
            .execute_with_outcome(move || async move {
                let connection = provider.acquire().await?;
                op(connection).await
            })
            .await;

        if let Err(err) = &outcome.result {
            debug!(attempts = outcome.attempts, error = %err.last_error(), "Retry loop gave up");
        }
        outcome
    }
}

impl fmt::Debug for RetryLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryLoop").field("config", self.executor.config()).finish_non_exhaustive()
    }
}
