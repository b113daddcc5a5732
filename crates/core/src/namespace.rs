//! Namespace translation between caller paths and service paths
//!
//! A client scoped to namespace `app` sees `/a` where the service stores
//! `/app/a`. Builders normalize on the way in and denormalize on the way out.

use std::fmt;

use keeper_domain::constants::{PATH_SEPARATOR, ROOT_PATH};
use keeper_domain::{KeeperError, KeeperResult};

use crate::paths::{make_path, validate_path};

/// Maps caller-visible paths to service paths and back
pub trait NamespaceTranslator: Send + Sync + fmt::Debug {
    /// Namespace prefix in use, without separators at either end
    fn namespace(&self) -> Option<&str>;

    /// Validate a caller path and prefix it with the namespace
    fn normalize(&self, path: &str) -> KeeperResult<String>;

    /// Strip the namespace prefix from a service path
    fn denormalize(&self, path: &str) -> String;
}

/// Chroot-style namespace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespace {
    name: Option<String>,
    prefix: Option<String>,
}

impl Namespace {
    /// Namespace rooted at `/`
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a namespace from a name such as `app` or `/app/v1/`
    ///
    /// Empty names and `/` yield the root namespace.
    pub fn new(name: &str) -> KeeperResult<Self> {
        let trimmed = name.trim_matches(PATH_SEPARATOR);
        if trimmed.is_empty() {
            return Ok(Self::root());
        }

        let prefix = make_path(ROOT_PATH, trimmed);
        validate_path(&prefix).map_err(|err| match err {
            KeeperError::InvalidPath { reason, .. } => {
                KeeperError::invalid_path(name, format!("invalid namespace: {reason}"))
            }
            other => other,
        })?;

        Ok(Self { name: Some(trimmed.to_string()), prefix: Some(prefix) })
    }

    /// Build from an optional name, as found in configuration
    pub fn from_option(name: Option<&str>) -> KeeperResult<Self> {
        name.map_or_else(|| Ok(Self::root()), Self::new)
    }
}

impl NamespaceTranslator for Namespace {
    fn namespace(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn normalize(&self, path: &str) -> KeeperResult<String> {
        validate_path(path)?;
        Ok(match &self.prefix {
            Some(prefix) => make_path(prefix, path),
            None => path.to_string(),
        })
    }

    fn denormalize(&self, path: &str) -> String {
        let Some(prefix) = &self.prefix else {
            return path.to_string();
        };
        match path.strip_prefix(prefix.as_str()) {
            Some("") => ROOT_PATH.to_string(),
            Some(rest) if rest.starts_with(PATH_SEPARATOR) => rest.to_string(),
            _ => path.to_string(),
        }
    }
}
