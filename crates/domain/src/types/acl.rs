//! Access-control entries
//!
//! An [`Acl`] grants a permission bitmask to an identity. Identities are a
//! `(scheme, id)` pair; the well-known world identity is `world:anyone`.

use std::fmt;
use std::ops::{BitAnd, BitOr};

use serde::{Deserialize, Serialize};

use crate::constants::{WORLD_ID, WORLD_SCHEME};

/// Permission bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Perms(u32);

impl Perms {
    pub const NONE: Self = Self(0);
    pub const READ: Self = Self(1);
    pub const WRITE: Self = Self(2);
    pub const CREATE: Self = Self(4);
    pub const DELETE: Self = Self(8);
    pub const ADMIN: Self = Self(16);
    pub const ALL: Self = Self(31);

    /// Build from raw bits; bits outside [`Perms::ALL`] are discarded.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Perms {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for Perms {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Display for Perms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const LETTERS: [(Perms, char); 5] = [
            (Perms::CREATE, 'c'),
            (Perms::DELETE, 'd'),
            (Perms::READ, 'r'),
            (Perms::WRITE, 'w'),
            (Perms::ADMIN, 'a'),
        ];
        for (perm, letter) in LETTERS {
            if self.contains(perm) {
                write!(f, "{letter}")?;
            }
        }
        Ok(())
    }
}

/// Identity an ACL entry applies to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Id {
    pub scheme: String,
    pub id: String,
}

impl Id {
    pub fn new(scheme: impl Into<String>, id: impl Into<String>) -> Self {
        Self { scheme: scheme.into(), id: id.into() }
    }

    /// The `world:anyone` identity
    pub fn world() -> Self {
        Self::new(WORLD_SCHEME, WORLD_ID)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scheme, self.id)
    }
}

/// A single access-control entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Acl {
    pub perms: Perms,
    pub id: Id,
}

impl Acl {
    pub fn new(perms: Perms, id: Id) -> Self {
        Self { perms, id }
    }

    /// Entry granting `perms` to everyone
    pub fn world(perms: Perms) -> Self {
        Self::new(perms, Id::world())
    }

    /// The single-entry list granting every permission to everyone
    pub fn open_unsafe() -> Vec<Self> {
        vec![Self::world(Perms::ALL)]
    }
}

impl fmt::Display for Acl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.id, self.perms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perms_bit_values() {
        assert_eq!(Perms::READ.bits(), 1);
        assert_eq!(Perms::WRITE.bits(), 2);
        assert_eq!(Perms::CREATE.bits(), 4);
        assert_eq!(Perms::DELETE.bits(), 8);
        assert_eq!(Perms::ADMIN.bits(), 16);
        assert_eq!(Perms::ALL.bits(), 31);
    }

    #[test]
    fn test_perms_combination() {
        let rw = Perms::READ | Perms::WRITE;
        assert!(rw.contains(Perms::READ));
        assert!(!rw.contains(Perms::ADMIN));
        assert!(Perms::ALL.contains(rw));
        assert_eq!(rw & Perms::WRITE, Perms::WRITE);
        assert_eq!(Perms::from_bits(0xFF), Perms::ALL);
        assert!(Perms::NONE.is_empty());
    }

    #[test]
    fn test_world_acl() {
        let acl = Acl::world(Perms::ALL);
        assert_eq!(acl.id.scheme, "world");
        assert_eq!(acl.id.id, "anyone");
        assert_eq!(acl.to_string(), "world:anyone=cdrwa");
        assert_eq!(Acl::open_unsafe(), vec![acl]);
    }

    #[test]
    fn test_acl_serde_shape() {
        let acl = Acl::new(Perms::READ, Id::new("digest", "bob:hash"));
        let json = serde_json::to_value(&acl).unwrap();
        assert_eq!(json["perms"], 1);
        assert_eq!(json["id"]["scheme"], "digest");
    }
}
