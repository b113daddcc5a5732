//! Integration tests for the retry executor
//!
//! Exercises the executor through the public API with an error type that
//! classifies itself, the way downstream crates plug their own errors in.

#![cfg(feature = "runtime")]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use keeper_common::resilience::{
    policies, retry_with_policy, RetryConfig, RetryError, RetryExecutor,
};
use keeper_common::{CommonError, ErrorClassification};

/// Custom error type for testing
#[derive(Debug, Clone, PartialEq, Eq)]
struct TestError {
    message: String,
    transient: bool,
}

impl TestError {
    fn transient(message: &str) -> Self {
        Self { message: message.to_string(), transient: true }
    }

    fn fatal(message: &str) -> Self {
        Self { message: message.to_string(), transient: false }
    }
}

/// Validates retry with exponential backoff recovering from transient faults.
///
/// # Test Steps
/// 1. Configure exponential backoff with 5 attempts
/// 2. Fail the first 3 attempts
/// 3. Verify the 4th attempt's value is returned
#[tokio::test(flavor = "multi_thread")]
async fn test_retry_exponential_backoff_success() {
    let attempt_count = Arc::new(AtomicU32::new(0));
    let attempt_count_clone = Arc::clone(&attempt_count);

    let config = RetryConfig::builder()
        .max_attempts(5)
        .exponential_backoff(Duration::from_millis(2), 2.0, Duration::from_millis(20))
        .full_jitter()
        .build()
        .expect("Failed to build config");

    let result = retry_with_policy(config, policies::AlwaysRetry, || {
        let counter = Arc::clone(&attempt_count_clone);
        async move {
            let count = counter.fetch_add(1, Ordering::SeqCst);
            if count < 3 {
                Err(TestError::transient("connection dropped"))
            } else {
                Ok("success")
            }
        }
    })
    .await;

    assert_eq!(result.ok(), Some("success"));
    assert_eq!(attempt_count.load(Ordering::SeqCst), 4);
}

/// Validates that a predicate policy stops on the first fatal error and the
/// fatal error itself is reported.
///
/// # Test Steps
/// 1. Fail with a transient error, then a fatal one
/// 2. Verify exactly two attempts ran
/// 3. Verify the returned error carries the fatal error
#[tokio::test]
async fn test_predicate_policy_stops_on_fatal_error() {
    let attempt_count = AtomicU32::new(0);
    let policy = policies::PredicateRetry::new(|error: &TestError, _| error.transient);
    let config = RetryConfig::builder()
        .max_attempts(10)
        .fixed_backoff(Duration::from_millis(1))
        .no_jitter()
        .build()
        .expect("Failed to build config");

    let result = RetryExecutor::new(config, policy)
        .execute(|| async {
            let count = attempt_count.fetch_add(1, Ordering::SeqCst);
            if count == 0 {
                Err::<(), _>(TestError::transient("timeout"))
            } else {
                Err(TestError::fatal("bad version"))
            }
        })
        .await;

    let err = result.expect_err("Fatal error should stop the executor");
    assert!(matches!(err, RetryError::NonRetryable { attempts: 2, .. }));
    assert_eq!(err.into_source(), TestError::fatal("bad version"));
    assert_eq!(attempt_count.load(Ordering::SeqCst), 2);
}

/// Validates that the classification trait can drive the retry policy.
///
/// # Test Steps
/// 1. Build a policy from `ErrorClassification::is_retryable`
/// 2. Fail with a retryable `CommonError::Timeout` every time
/// 3. Verify the executor exhausts its attempts and surfaces the timeout
#[tokio::test]
async fn test_classification_driven_policy_exhausts() {
    let attempt_count = AtomicU32::new(0);
    let policy = policies::PredicateRetry::new(|error: &CommonError, _| error.is_retryable());
    let config = RetryConfig::builder()
        .max_attempts(3)
        .fixed_backoff(Duration::from_millis(1))
        .no_jitter()
        .build()
        .expect("Failed to build config");

    let outcome = RetryExecutor::new(config, policy)
        .execute_with_outcome(|| async {
            attempt_count.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(CommonError::timeout("get_acl", Duration::from_millis(5)))
        })
        .await;

    assert_eq!(outcome.attempts, 3);
    assert!(!outcome.timed_out);
    match outcome.into_inner() {
        Err(CommonError::Timeout { operation, .. }) => assert_eq!(operation, "get_acl"),
        other => panic!("Expected timeout to surface, got {other:?}"),
    }
    assert_eq!(attempt_count.load(Ordering::SeqCst), 3);
}

/// Validates that invalid configurations are rejected with a config error.
#[test]
fn test_invalid_config_is_config_error() {
    let err = RetryConfig::builder().max_attempts(0).build().expect_err("zero attempts");
    assert!(matches!(err, CommonError::Config { .. }));
    assert!(!err.is_retryable());
}
