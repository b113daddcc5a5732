//! # Keeper Infrastructure
//!
//! Adapters around the `keeper-core` ports.
//!
//! This crate contains:
//! - `MemoryEnsemble`, an in-process coordination service implementing
//!   `ConnectionProvider` with fault injection for tests and local runs
//! - The configuration loader (environment variables, TOML and JSON files)
//! - The `tracing-subscriber` bootstrap

pub mod config;
pub mod memory;
pub mod observability;

pub use memory::MemoryEnsemble;
pub use observability::init_tracing;
