//! Retry loop for connection operations
//!
//! Wraps the generic executor from `keeper-common` with the connection
//! acquisition step and a policy that only retries connection faults.

pub mod policy;
pub mod retry_loop;

pub use policy::{bounded_fixed, retry_config_from_settings, ConnectionLossPolicy, SharedRetryPolicy};
pub use retry_loop::RetryLoop;
