//! # Keeper Core
//!
//! Retry-aware operation builders for a coordination-service client.
//!
//! This crate contains:
//! - Port interfaces for the session layer (`ConnectionProvider`,
//!   `Connection`)
//! - The access policy (`AclProvider`) and namespace translation
//! - The retry loop that masks transient connection faults
//! - The foreground/background execution contract and event delivery
//! - The `GetAcl`/`SetAcl` builders reached through `KeeperClient`
//!
//! ## Architecture Principles
//! - Depends only on `keeper-common` and `keeper-domain`
//! - No network or wire-protocol code; sessions are injected via traits
//! - Every operation runs through the same retry loop in both modes

pub mod acl;
pub mod builders;
pub mod framework;
pub mod namespace;
pub mod paths;
pub mod ports;
pub mod retry;

pub use acl::{AclProvider, DefaultAclProvider, PathAclProvider};
pub use builders::{Acling, GetAclBuilder, SetAclBuilder, StatSlot};
pub use framework::{
    BackgroundCallback, BackgroundContext, BackgroundTask, Backgroundable, Backgrounding, Event,
    EventDispatcher, EventKind, KeeperClient, KeeperClientBuilder, Submission,
};
pub use namespace::{Namespace, NamespaceTranslator};
pub use ports::{Connection, ConnectionProvider};
pub use retry::{ConnectionLossPolicy, RetryLoop, SharedRetryPolicy};
