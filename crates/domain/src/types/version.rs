use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::ANY_VERSION;

/// Version precondition for a conditional write
///
/// `Any` skips the check. `Exact(0)` is a real version and is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedVersion {
    #[default]
    Any,
    Exact(i32),
}

impl ExpectedVersion {
    /// Whether `actual` satisfies this precondition
    pub fn matches(self, actual: i32) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(expected) => expected == actual,
        }
    }

    /// Wire representation, `-1` for `Any`
    pub fn as_raw(self) -> i32 {
        match self {
            Self::Any => ANY_VERSION,
            Self::Exact(v) => v,
        }
    }
}

impl From<i32> for ExpectedVersion {
    fn from(raw: i32) -> Self {
        if raw < 0 {
            Self::Any
        } else {
            Self::Exact(raw)
        }
    }
}

impl fmt::Display for ExpectedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::Exact(v) => write!(f, "{v}"),
        }
    }
}
