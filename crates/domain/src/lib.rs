//! # Keeper Domain
//!
//! Data types and errors shared by the Keeper client layers.
//!
//! This crate contains:
//! - ACL, stat and version types exchanged with the coordination service
//! - `KeeperError`, its fault classes and the `KeeperResult` alias
//! - Client configuration structures
//! - Domain constants and macros
//!
//! ## Architecture
//! - Depends only on `keeper-common` (foundation tier)
//! - No async runtime, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
