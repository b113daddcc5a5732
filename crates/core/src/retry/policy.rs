//! Retry policies over [`KeeperError`]

use std::sync::Arc;
use std::time::Duration;

use keeper_common::resilience::policies::AlwaysRetry;
use keeper_common::{
    BackoffStrategy, ErrorClassification, Jitter, RetryConfig, RetryDecision, RetryPolicy,
};
use keeper_domain::constants::DEFAULT_EXPONENTIAL_BASE;
use keeper_domain::{BackoffKind, JitterKind, KeeperError, KeeperResult, RetrySettings};

/// Shareable, object-safe policy handle
pub type SharedRetryPolicy = Arc<dyn RetryPolicy<KeeperError> + Send + Sync>;

/// Stops on anything that is not a connection fault, otherwise defers to
/// the wrapped policy
#[derive(Debug, Clone)]
pub struct ConnectionLossPolicy<P = AlwaysRetry> {
    inner: P,
}

impl<P> ConnectionLossPolicy<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

impl Default for ConnectionLossPolicy {
    fn default() -> Self {
        Self::new(AlwaysRetry)
    }
}

impl<P> RetryPolicy<KeeperError> for ConnectionLossPolicy<P>
where
    P: RetryPolicy<KeeperError>,
{
    fn should_retry(&self, error: &KeeperError, attempt: u32) -> RetryDecision {
        if !error.is_retryable() {
            return RetryDecision::Stop;
        }
        match (self.inner.should_retry(error, attempt), error.retry_after()) {
            (RetryDecision::Retry, Some(delay)) => RetryDecision::RetryAfter(delay),
            (decision, _) => decision,
        }
    }
}

/// Translate configured retry settings into an executor configuration
pub fn retry_config_from_settings(settings: &RetrySettings) -> KeeperResult<RetryConfig> {
    settings.validate()?;

    let backoff = match settings.backoff {
        BackoffKind::Fixed => BackoffStrategy::Fixed(settings.base_delay),
        BackoffKind::Linear => BackoffStrategy::Linear {
            initial_delay: settings.base_delay,
            increment: settings.base_delay,
        },
        BackoffKind::Exponential => BackoffStrategy::Exponential {
            initial_delay: settings.base_delay,
            base: DEFAULT_EXPONENTIAL_BASE,
            max_delay: settings.max_delay,
        },
    };
    let jitter = match settings.jitter {
        JitterKind::None => Jitter::None,
        JitterKind::Full => Jitter::Full,
        JitterKind::Equal => Jitter::Equal,
    };

    let config = RetryConfig {
        max_attempts: settings.max_attempts,
        backoff,
        jitter,
        max_total_time: settings.max_total_time,
    };
    config.validate()?;
    Ok(config)
}

/// Bounded attempts with a fixed delay and no jitter
pub fn bounded_fixed(max_attempts: u32, delay: Duration) -> KeeperResult<RetryConfig> {
    Ok(RetryConfig::builder()
        .max_attempts(max_attempts)
        .fixed_backoff(delay)
        .no_jitter()
        .unlimited_time()
        .build()?)
}
