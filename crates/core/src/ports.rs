//! Port interfaces for the coordination-service session
//!
//! These traits define the boundary between the operation builders and the
//! session implementation. Connection handles are shared and internally
//! synchronized by the implementation; callers add no locking of their own.

use std::sync::Arc;

use async_trait::async_trait;
use keeper_domain::{Acl, ExpectedVersion, KeeperResult, Stat};

/// Source of live connections
///
/// `acquire` fails with a connection fault while a reconnect is in progress.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    /// Get a live connection handle
    async fn acquire(&self) -> KeeperResult<Arc<dyn Connection>>;
}

/// Raw ACL operations on a live connection
#[async_trait]
pub trait Connection: Send + Sync {
    /// Read the ACL and stat of the node at `path` (already namespaced)
    async fn get_acl(&self, path: &str) -> KeeperResult<(Vec<Acl>, Stat)>;

    /// Replace the ACL of the node at `path` if `version` matches its ACL
    /// version, returning the updated stat
    async fn set_acl(
        &self,
        path: &str,
        acl: &[Acl],
        version: ExpectedVersion,
    ) -> KeeperResult<Stat>;
}
