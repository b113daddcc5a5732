//! Access policy: which ACL entries a write uses when none are given

pub mod provider;

pub use provider::{AclProvider, DefaultAclProvider, PathAclProvider};
