//! End-to-end tests against the in-memory ensemble
//!
//! Drives `KeeperClient` over `MemoryEnsemble` through reconnects, session
//! expiry, permission checks and concurrent writers.

mod support;

use std::sync::Arc;
use std::time::Duration;

use keeper_core::{Backgroundable, EventKind, KeeperClient, StatSlot};
use keeper_domain::{Acl, ExpectedVersion, FaultClass, Id, KeeperError, Perms};
use keeper_infra::MemoryEnsemble;
use support::{client, client_with_attempts, recorder};

fn digest(user: &str) -> Id {
    Id::new("digest", format!("{user}:hash"))
}

/// Validates a full set/get cycle inside a namespace.
///
/// # Test Steps
/// 1. Create `/app/config` in the ensemble
/// 2. Restrict it through a client scoped to `app`
/// 3. Read it back through the same client and through a root view
#[tokio::test]
async fn test_namespaced_set_then_get() {
    let ensemble = MemoryEnsemble::new().with_node("/app/config").unwrap();
    let client =
        KeeperClient::builder(Arc::new(ensemble.clone())).namespace("app").build().unwrap();
    let entries = vec![Acl::new(Perms::ALL, digest("ops")), Acl::world(Perms::READ)];

    let stat = client
        .set_acl()
        .with_acl(entries.clone())
        .with_version(0)
        .for_path("/config")
        .await
        .unwrap()
        .completed()
        .unwrap();
    assert_eq!(stat.aversion, 1);
    assert_eq!(ensemble.acl("/app/config"), Some(entries.clone()));

    let acl = client.get_acl().for_path("/config").await.unwrap().completed().unwrap();
    assert_eq!(acl, entries);

    let root = client.using_namespace(None).unwrap();
    let acl = root.get_acl().for_path("/app/config").await.unwrap().completed().unwrap();
    assert_eq!(acl, entries);
}

/// Validates that dropped connections are masked while the bound allows.
///
/// # Test Steps
/// 1. Fail two acquisitions, as during a reconnect
/// 2. Verify the read succeeds on the third attempt with one operation
#[tokio::test]
async fn test_read_survives_reconnect() {
    let ensemble = MemoryEnsemble::new().with_node("/a").unwrap();
    ensemble.fail_acquisitions(2, KeeperError::ConnectionLoss);
    let client = client(&ensemble);

    let acl = client.get_acl().for_path("/a").await.unwrap().completed().unwrap();

    assert_eq!(acl, Acl::open_unsafe());
    assert_eq!(ensemble.acquisitions(), 3);
    assert_eq!(ensemble.operations(), 1);
}

/// Validates that a disconnected ensemble surfaces `ConnectionLoss` once the
/// bound is exhausted, and nothing is written.
#[tokio::test]
async fn test_disconnected_ensemble_exhausts_bound() {
    let ensemble = MemoryEnsemble::new().with_node("/a").unwrap();
    ensemble.disconnect();
    let client = client_with_attempts(&ensemble, 4);

    let err = client.set_acl().with_acl([Acl::world(Perms::READ)]).for_path("/a").await;

    assert_eq!(err.unwrap_err(), KeeperError::ConnectionLoss);
    assert_eq!(ensemble.acquisitions(), 4);
    assert_eq!(ensemble.stat("/a").unwrap().aversion, 0);
}

/// Validates that an expired session is replaced by the retry loop.
///
/// # Test Steps
/// 1. Slow every operation down and dispatch a background read
/// 2. Expire the session while the first attempt is in flight
/// 3. Verify the callback sees success after a second acquisition
#[tokio::test]
async fn test_session_expiry_during_background_read() {
    let ensemble = MemoryEnsemble::new().with_node("/a").unwrap();
    ensemble.set_latency(Duration::from_millis(100));
    let client = client(&ensemble);
    let (events, callback) = recorder();

    let task = client
        .get_acl()
        .in_background_with_callback(callback)
        .for_path("/a")
        .await
        .unwrap()
        .into_task()
        .unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;
    ensemble.expire_session();
    task.join().await.unwrap();

    let events = events.lock();
    assert_eq!(events.len(), 1);
    assert!(events[0].is_ok(), "unexpected error: {:?}", events[0].err);
    assert_eq!(ensemble.acquisitions(), 2);
    assert_eq!(ensemble.session_id(), 2);
}

/// Validates that permission failures are surfaced after one attempt.
#[tokio::test]
async fn test_missing_admin_permission_is_not_retried() {
    let ensemble = MemoryEnsemble::new();
    ensemble.create("/locked", vec![Acl::new(Perms::ALL, digest("alice"))]).unwrap();
    let client = client_with_attempts(&ensemble, 5);

    let err = client.set_acl().for_path("/locked").await.unwrap_err();
    assert_eq!(err, KeeperError::NoAuth { path: "/locked".into() });
    assert_eq!(err.class(), FaultClass::Semantic);
    assert_eq!(ensemble.acquisitions(), 1);

    ensemble.add_auth(digest("alice"));
    assert!(client.set_acl().for_path("/locked").await.is_ok());
    assert_eq!(ensemble.acl("/locked"), Some(Acl::open_unsafe()));
}

/// Validates that malformed entries are rejected by the service.
#[tokio::test]
async fn test_service_rejects_invalid_entries() {
    let ensemble = MemoryEnsemble::new().with_node("/a").unwrap();
    let client = client(&ensemble);

    let bogus = Acl::new(Perms::ALL, Id::new("world", "bob"));
    let err = client.set_acl().with_acl([bogus]).for_path("/a").await.unwrap_err();

    assert_eq!(err, KeeperError::InvalidAcl { path: "/a".into() });
    assert_eq!(ensemble.acquisitions(), 1);
}

/// Validates optimistic concurrency between two writers.
///
/// # Test Steps
/// 1. Two clients read the same ACL version
/// 2. The first write with that version wins
/// 3. The second write fails with `BadVersion` naming the new version
#[tokio::test]
async fn test_concurrent_writers_conflict_on_version() {
    let ensemble = MemoryEnsemble::new().with_node("/shared").unwrap();
    let first = client(&ensemble);
    let second = client(&ensemble);

    let slot = StatSlot::new();
    first.get_acl().storing_stat_in(slot.clone()).for_path("/shared").await.unwrap();
    let seen = ExpectedVersion::Exact(slot.get().unwrap().aversion);

    first
        .set_acl()
        .with_acl([Acl::world(Perms::READ)])
        .with_version(seen)
        .for_path("/shared")
        .await
        .unwrap();
    let err = second.set_acl().with_version(seen).for_path("/shared").await.unwrap_err();

    assert_eq!(err, KeeperError::BadVersion { path: "/shared".into(), expected: 0, actual: 1 });
    assert_eq!(ensemble.acl("/shared"), Some(vec![Acl::world(Perms::READ)]));
}

/// Validates that background writes to the ensemble report the resolved
/// entries and resulting stat.
#[tokio::test]
async fn test_background_write_reports_resolved_entries() {
    let ensemble = MemoryEnsemble::new().with_node("/svc/a").unwrap();
    let client = KeeperClient::builder(Arc::new(ensemble.clone()))
        .namespace("svc")
        .default_acl(vec![Acl::world(Perms::READ | Perms::WRITE)])
        .build()
        .unwrap();
    let (events, callback) = recorder();

    client
        .set_acl()
        .in_background_with_callback(callback)
        .for_path("/a")
        .await
        .unwrap()
        .into_task()
        .unwrap()
        .join()
        .await
        .unwrap();

    let events = events.lock();
    let event = &events[0];
    assert_eq!(event.kind, EventKind::SetAcl);
    assert_eq!(event.path, "/a");
    assert_eq!(event.acl, vec![Acl::world(Perms::READ | Perms::WRITE)]);
    assert_eq!(event.stat, ensemble.stat("/svc/a"));
}
