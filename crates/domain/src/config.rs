//! Client configuration
//!
//! Every field has a default, so a configuration file only needs to name
//! what it changes. Delays are expressed in milliseconds.

use std::time::Duration;

use keeper_common::{duration_millis, option_duration_millis, CommonError};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_BASE_DELAY_MS, DEFAULT_RETRY_MAX_DELAY_MS,
    DEFAULT_RETRY_MAX_TOTAL_MS, PATH_SEPARATOR,
};
use crate::impl_keyword_conversions;
use crate::types::Acl;
use crate::KeeperResult;

/// Top-level client configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Namespace prefix applied to every path, e.g. `"app"` or `"/app/v1"`
    pub namespace: Option<String>,
    /// ACL used when a write does not supply one; world/ALL when empty
    pub default_acl: Vec<Acl>,
    pub retry: RetrySettings,
    pub background: BackgroundSettings,
}

impl ClientConfig {
    /// Check the configuration for values the client cannot run with
    pub fn validate(&self) -> KeeperResult<()> {
        if let Some(namespace) = &self.namespace {
            let trimmed = namespace.trim_matches(PATH_SEPARATOR);
            if !trimmed.is_empty() && trimmed.split(PATH_SEPARATOR).any(str::is_empty) {
                return Err(CommonError::config_field(
                    "namespace",
                    format!("namespace {namespace:?} contains an empty segment"),
                )
                .into());
            }
        }
        self.retry.validate()?;
        if self.background.max_concurrent == Some(0) {
            return Err(CommonError::config_field(
                "background.max_concurrent",
                "max_concurrent must be greater than 0 when set",
            )
            .into());
        }
        Ok(())
    }
}

/// Backoff shape between retry attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    Fixed,
    Linear,
    #[default]
    Exponential,
}

impl_keyword_conversions!(BackoffKind {
    Fixed => "fixed",
    Linear => "linear",
    Exponential => "exponential",
});

/// Randomization applied to each computed delay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JitterKind {
    None,
    Full,
    #[default]
    Equal,
}

impl_keyword_conversions!(JitterKind {
    None => "none",
    Full => "full",
    Equal => "equal",
});

/// Retry loop settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total attempts including the first
    pub max_attempts: u32,
    pub backoff: BackoffKind,
    /// Fixed delay, linear increment, or exponential starting delay
    #[serde(rename = "base_delay_ms", with = "duration_millis")]
    pub base_delay: Duration,
    /// Upper bound for a single exponential delay
    #[serde(rename = "max_delay_ms", with = "duration_millis")]
    pub max_delay: Duration,
    pub jitter: JitterKind,
    /// Give up once this much time has been spent; unbounded when absent
    #[serde(rename = "max_total_time_ms", with = "option_duration_millis")]
    pub max_total_time: Option<Duration>,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_ATTEMPTS,
            backoff: BackoffKind::default(),
            base_delay: Duration::from_millis(DEFAULT_RETRY_BASE_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_RETRY_MAX_DELAY_MS),
            jitter: JitterKind::default(),
            max_total_time: Some(Duration::from_millis(DEFAULT_RETRY_MAX_TOTAL_MS)),
        }
    }
}

impl RetrySettings {
    pub fn validate(&self) -> KeeperResult<()> {
        if self.max_attempts == 0 {
            return Err(CommonError::config_field(
                "retry.max_attempts",
                "max_attempts must be greater than 0",
            )
            .into());
        }
        if self.backoff == BackoffKind::Exponential && self.base_delay > self.max_delay {
            return Err(CommonError::config_field(
                "retry.base_delay_ms",
                format!(
                    "base delay ({:?}) cannot exceed max delay ({:?})",
                    self.base_delay, self.max_delay
                ),
            )
            .into());
        }
        Ok(())
    }
}

/// Background dispatch settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundSettings {
    /// Maximum number of background operations executing at once
    pub max_concurrent: Option<usize>,
}
