//! Integration tests for the retry loop
//!
//! Drives `RetryLoop` against the scripted mock session to check which
//! faults are retried, how many attempts are made, and which error surfaces.

mod support;

use std::sync::Arc;
use std::time::Duration;

use keeper_common::resilience::policies::{NeverRetry, PredicateRetry};
use keeper_core::retry::bounded_fixed;
use keeper_core::{ConnectionProvider, RetryLoop, SharedRetryPolicy};
use keeper_domain::{Acl, KeeperError, Perms};
use support::MockConnectionProvider;

fn retry_loop(provider: &MockConnectionProvider, attempts: u32) -> RetryLoop {
    let provider: Arc<dyn ConnectionProvider> = Arc::new(provider.clone());
    RetryLoop::new(provider, bounded_fixed(attempts, Duration::from_millis(1)).unwrap())
}

/// Validates that connection faults are retried up to the bound and the
/// final fault itself is returned.
///
/// # Test Steps
/// 1. Script more connection faults than the bound allows
/// 2. Run a read through a loop bounded at 3 attempts
/// 3. Verify exactly 3 attempts and the raw `ConnectionLoss` error
#[tokio::test]
async fn test_connection_faults_exhaust_bound() {
    let provider = MockConnectionProvider::new().with_node("/a", Acl::open_unsafe());
    provider.fail_operations(10, KeeperError::ConnectionLoss);

    let result = retry_loop(&provider, 3)
        .call_with_retry(|conn| async move { conn.get_acl("/a").await })
        .await;

    assert_eq!(result.unwrap_err(), KeeperError::ConnectionLoss);
    assert_eq!(provider.attempts(), 3);
    assert_eq!(provider.operations(), 3);
}

/// Validates that semantic faults are surfaced after a single attempt.
#[tokio::test]
async fn test_semantic_fault_single_attempt() {
    let provider = MockConnectionProvider::new();

    let result = retry_loop(&provider, 5)
        .call_with_retry(|conn| async move { conn.get_acl("/missing").await })
        .await;

    assert_eq!(result.unwrap_err(), KeeperError::no_node("/missing"));
    assert_eq!(provider.attempts(), 1);
}

/// Validates that failed acquisitions (reconnect in progress) are retried
/// and the operation succeeds once a connection is available.
///
/// # Test Steps
/// 1. Fail the first two acquisitions with `SessionExpired`
/// 2. Verify the third attempt succeeds
/// 3. Verify the operation itself ran only once
#[tokio::test]
async fn test_acquisition_faults_are_retried() {
    let provider = MockConnectionProvider::new().with_node("/a", Acl::open_unsafe());
    provider.fail_acquisitions(2, KeeperError::SessionExpired);

    let outcome = retry_loop(&provider, 3)
        .call_with_outcome(|conn| async move { conn.get_acl("/a").await })
        .await;

    assert_eq!(outcome.attempts, 3);
    let (acl, _) = outcome.into_inner().unwrap();
    assert_eq!(acl, vec![Acl::world(Perms::ALL)]);
    assert_eq!(provider.operations(), 1);
}

/// Validates the attempt count reported for an exhausted loop.
#[tokio::test]
async fn test_outcome_reports_attempts_on_exhaustion() {
    let provider = MockConnectionProvider::new();
    provider.fail_acquisitions(5, KeeperError::OperationTimeout);

    let outcome = retry_loop(&provider, 4)
        .call_with_outcome(|conn| async move { conn.get_acl("/a").await })
        .await;

    assert_eq!(outcome.attempts, 4);
    assert_eq!(outcome.into_inner().unwrap_err(), KeeperError::OperationTimeout);
}

/// Validates that an additional policy can veto retries of connection
/// faults.
#[tokio::test]
async fn test_custom_policy_can_veto() {
    let provider = MockConnectionProvider::new();
    provider.fail_operations(3, KeeperError::SessionMoved);

    let policy: SharedRetryPolicy = Arc::new(NeverRetry);
    let retry = RetryLoop::with_policy(
        Arc::new(provider.clone()),
        bounded_fixed(3, Duration::from_millis(1)).unwrap(),
        policy,
    );

    let result = retry.call_with_retry(|conn| async move { conn.get_acl("/a").await }).await;

    assert_eq!(result.unwrap_err(), KeeperError::SessionMoved);
    assert_eq!(provider.attempts(), 1);
}

/// Validates that the custom policy only sees connection faults.
#[tokio::test]
async fn test_custom_policy_never_overrides_semantic_stop() {
    let provider = MockConnectionProvider::new();
    let policy: SharedRetryPolicy = Arc::new(PredicateRetry::new(|_: &KeeperError, _| true));
    let retry = RetryLoop::with_policy(
        Arc::new(provider.clone()),
        bounded_fixed(3, Duration::from_millis(1)).unwrap(),
        policy,
    );

    let result = retry.call_with_retry(|conn| async move { conn.get_acl("/none").await }).await;

    assert!(matches!(result, Err(KeeperError::NoNode { .. })));
    assert_eq!(provider.attempts(), 1);
}
