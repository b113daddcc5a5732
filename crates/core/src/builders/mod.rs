//! Fluent operation builders
//!
//! A builder collects options, then `for_path` consumes it and either runs
//! the operation inline or dispatches it to a background task.

pub mod get_acl;
pub mod set_acl;
pub mod stat_slot;

pub use get_acl::GetAclBuilder;
pub use set_acl::{Acling, SetAclBuilder};
pub use stat_slot::StatSlot;
