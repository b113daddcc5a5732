//! Shared test helpers for `keeper-core` integration tests.
//!
//! These helpers provide an in-memory session with scripted faults so that
//! builder and retry tests can focus on behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod connections;
pub mod tracer;

use std::sync::Arc;
use std::time::Duration;

use keeper_core::retry::bounded_fixed;
use keeper_core::KeeperClient;

pub use connections::MockConnectionProvider;
pub use tracer::RecordingTracer;

/// Client over `provider` retrying up to `attempts` times with a 1ms delay.
pub fn client_with_attempts(provider: &MockConnectionProvider, attempts: u32) -> KeeperClient {
    KeeperClient::builder(Arc::new(provider.clone()))
        .retry_config(bounded_fixed(attempts, Duration::from_millis(1)).expect("valid retry config"))
        .build()
        .expect("client should build")
}

/// Client with the default test retry bound of 3 attempts.
pub fn client(provider: &MockConnectionProvider) -> KeeperClient {
    client_with_attempts(provider, 3)
}
