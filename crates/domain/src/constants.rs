//! Domain constants
//!
//! Centralized location for protocol and configuration defaults used
//! throughout the workspace.

// Protocol constants
pub const PATH_SEPARATOR: char = '/';
pub const ROOT_PATH: &str = "/";
/// Wire value meaning "skip the version check"
pub const ANY_VERSION: i32 = -1;
pub const WORLD_SCHEME: &str = "world";
pub const WORLD_ID: &str = "anyone";

// Retry defaults
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 100;
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 5_000;
pub const DEFAULT_RETRY_MAX_TOTAL_MS: u64 = 60_000;
pub const DEFAULT_EXPONENTIAL_BASE: f64 = 2.0;

// Diagnostic trace labels
pub const TRACE_GET_ACL_BACKGROUND: &str = "GetACL-Background";
pub const TRACE_SET_ACL_BACKGROUND: &str = "SetACL-Background";

// Environment variable names read by the configuration loader
pub const ENV_NAMESPACE: &str = "KEEPER_NAMESPACE";
pub const ENV_RETRY_MAX_ATTEMPTS: &str = "KEEPER_RETRY_MAX_ATTEMPTS";
pub const ENV_RETRY_BACKOFF: &str = "KEEPER_RETRY_BACKOFF";
pub const ENV_RETRY_BASE_DELAY_MS: &str = "KEEPER_RETRY_BASE_DELAY_MS";
pub const ENV_RETRY_MAX_DELAY_MS: &str = "KEEPER_RETRY_MAX_DELAY_MS";
pub const ENV_RETRY_JITTER: &str = "KEEPER_RETRY_JITTER";
pub const ENV_RETRY_MAX_TOTAL_MS: &str = "KEEPER_RETRY_MAX_TOTAL_MS";
pub const ENV_BACKGROUND_MAX_CONCURRENT: &str = "KEEPER_BACKGROUND_MAX_CONCURRENT";
pub const ENV_CONFIG_PATH: &str = "KEEPER_CONFIG";
