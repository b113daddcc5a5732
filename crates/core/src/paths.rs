//! Node path utilities
//!
//! Paths are absolute, `/`-separated, and never end with a separator except
//! for the root itself.

use keeper_domain::constants::{PATH_SEPARATOR, ROOT_PATH};
use keeper_domain::{KeeperError, KeeperResult};

/// Check that `path` is a legal node path
pub fn validate_path(path: &str) -> KeeperResult<()> {
    if path.is_empty() {
        return Err(KeeperError::invalid_path(path, "path must not be empty"));
    }
    if !path.starts_with(PATH_SEPARATOR) {
        return Err(KeeperError::invalid_path(path, "path must start with '/'"));
    }
    if path == ROOT_PATH {
        return Ok(());
    }
    if path.ends_with(PATH_SEPARATOR) {
        return Err(KeeperError::invalid_path(path, "path must not end with '/'"));
    }

    for segment in path[1..].split(PATH_SEPARATOR) {
        match segment {
            "" => return Err(KeeperError::invalid_path(path, "empty node name")),
            "." | ".." => {
                return Err(KeeperError::invalid_path(
                    path,
                    "relative segments are not allowed",
                ))
            }
            _ => {}
        }
    }

    if let Some(c) = path.chars().find(|c| is_forbidden_char(*c)) {
        return Err(KeeperError::invalid_path(
            path,
            format!("invalid character U+{:04X}", u32::from(c)),
        ));
    }

    Ok(())
}

fn is_forbidden_char(c: char) -> bool {
    matches!(c,
        '\u{0000}'..='\u{001f}'
        | '\u{007f}'..='\u{009f}'
        | '\u{e000}'..='\u{f8ff}'
        | '\u{fff0}'..='\u{ffff}')
}

/// Leaf name of `path`: everything after the last separator
///
/// Returns `""` for the root and the input itself when it has no separator.
pub fn node_from_path(path: &str) -> &str {
    match path.rfind(PATH_SEPARATOR) {
        Some(i) => &path[i + 1..],
        None => path,
    }
}

/// Join `parent` and `child` with exactly one separator between them
pub fn make_path(parent: &str, child: &str) -> String {
    let mut path = String::with_capacity(parent.len() + child.len() + 2);

    if !parent.starts_with(PATH_SEPARATOR) {
        path.push(PATH_SEPARATOR);
    }
    path.push_str(parent.trim_end_matches(PATH_SEPARATOR));

    let child = child.trim_start_matches(PATH_SEPARATOR);
    if child.is_empty() {
        if path.is_empty() || path == ROOT_PATH {
            return ROOT_PATH.to_string();
        }
        return path;
    }

    if !path.ends_with(PATH_SEPARATOR) {
        path.push(PATH_SEPARATOR);
    }
    path.push_str(child);
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_legal_paths() {
        for path in ["/", "/a", "/a/b", "/app/node-0001", "/with space", "/ünïcode"] {
            assert!(validate_path(path).is_ok(), "{path} should be valid");
        }
    }

    #[test]
    fn test_validate_rejects_illegal_paths() {
        for path in ["", "a", "a/b", "/a/", "//", "/a//b", "/a/./b", "/a/..", "/nul\u{0}"] {
            let err = validate_path(path).unwrap_err();
            assert!(matches!(err, KeeperError::InvalidPath { .. }), "{path:?}: {err}");
        }
    }

    #[test]
    fn test_node_from_path() {
        assert_eq!(node_from_path("/a/b/c"), "c");
        assert_eq!(node_from_path("/a"), "a");
        assert_eq!(node_from_path("/"), "");
        assert_eq!(node_from_path("plain"), "plain");
    }

    #[test]
    fn test_make_path() {
        assert_eq!(make_path("/app", "/a"), "/app/a");
        assert_eq!(make_path("app/", "a/b"), "/app/a/b");
        assert_eq!(make_path("/app", "/"), "/app");
        assert_eq!(make_path("/", "a"), "/a");
        assert_eq!(make_path("/", "/"), "/");
        assert_eq!(make_path("", ""), "/");
    }
}
