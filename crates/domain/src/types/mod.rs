//! Domain types exchanged with the coordination service

pub mod acl;
pub mod stat;
pub mod version;

pub use acl::{Acl, Id, Perms};
pub use stat::Stat;
pub use version::ExpectedVersion;
