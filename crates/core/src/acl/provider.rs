use std::fmt;

use keeper_domain::constants::{PATH_SEPARATOR, ROOT_PATH};
use keeper_domain::Acl;

/// Supplies ACL entries for writes that do not specify their own
///
/// Implementations must return a non-empty list for every legal path.
pub trait AclProvider: Send + Sync + fmt::Debug {
    /// Entries to use when nothing more specific applies
    fn default_acl(&self) -> Vec<Acl>;

    /// Entries to use for the node at `path` (caller-visible, not namespaced)
    fn acl_for_path(&self, path: &str) -> Vec<Acl>;
}

/// Returns the same list for every path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultAclProvider {
    acl: Vec<Acl>,
}

impl DefaultAclProvider {
    pub fn new(acl: Vec<Acl>) -> Self {
        Self { acl }
    }
}

impl Default for DefaultAclProvider {
    /// World-readable, world-writable: `world:anyone` with every permission
    fn default() -> Self {
        Self::new(Acl::open_unsafe())
    }
}

impl AclProvider for DefaultAclProvider {
    fn default_acl(&self) -> Vec<Acl> {
        self.acl.clone()
    }

    fn acl_for_path(&self, _path: &str) -> Vec<Acl> {
        self.acl.clone()
    }
}

/// Scopes ACL lists to path prefixes; the longest matching prefix wins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathAclProvider {
    default: Vec<Acl>,
    scoped: Vec<(String, Vec<Acl>)>,
}

impl PathAclProvider {
    pub fn new(default: Vec<Acl>) -> Self {
        Self { default, scoped: Vec::new() }
    }

    /// Use `acl` for `prefix` and everything below it
    pub fn with_path(mut self, prefix: impl Into<String>, acl: Vec<Acl>) -> Self {
        let mut prefix = prefix.into();
        while prefix.len() > 1 && prefix.ends_with(PATH_SEPARATOR) {
            prefix.pop();
        }
        self.scoped.retain(|(existing, _)| *existing != prefix);
        self.scoped.push((prefix, acl));
        self
    }

    fn covers(prefix: &str, path: &str) -> bool {
        if prefix == ROOT_PATH {
            return true;
        }
        match path.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with(PATH_SEPARATOR),
            None => false,
        }
    }
}

impl Default for PathAclProvider {
    fn default() -> Self {
        Self::new(Acl::open_unsafe())
    }
}

impl AclProvider for PathAclProvider {
    fn default_acl(&self) -> Vec<Acl> {
        self.default.clone()
    }

    fn acl_for_path(&self, path: &str) -> Vec<Acl> {
        self.scoped
            .iter()
            .filter(|(prefix, _)| Self::covers(prefix, path))
            .max_by_key(|(prefix, _)| prefix.len())
            .map_or_else(|| self.default.clone(), |(_, acl)| acl.clone())
    }
}
