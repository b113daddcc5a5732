//! Resilience patterns for transient failures
//!
//! Provides a generic retry executor that is parameterized over the error
//! type and the policy deciding which errors are worth another attempt. The
//! executor knows nothing about connections or sessions; callers plug in a
//! policy that classifies their own errors.
//!
//! ## Usage
//!
//! ```no_run
//! use std::time::Duration;
//! use keeper_common::resilience::{policies::AlwaysRetry, RetryConfig, RetryExecutor};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RetryConfig::builder()
//!     .max_attempts(3)
//!     .fixed_backoff(Duration::from_millis(10))
//!     .build()?;
//!
//! let executor = RetryExecutor::new(config, AlwaysRetry);
//! let value = executor.execute(|| async { Ok::<_, String>(7) }).await;
//! assert_eq!(value.ok(), Some(7));
//! # Ok(())
//! # }
//! ```

pub mod retry;

pub use retry::{
    policies, retry_with_policy, BackoffStrategy, Jitter, RetryConfig, RetryConfigBuilder,
    RetryDecision, RetryError, RetryExecutor, RetryOutcome, RetryPolicy, RetryResult,
};
