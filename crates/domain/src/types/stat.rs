use serde::{Deserialize, Serialize};

/// Node metadata maintained by the coordination service.
///
/// Callers never construct meaningful stats themselves; they receive them
/// from the service after a read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stat {
    /// Transaction id that created the node
    pub czxid: i64,
    /// Transaction id that last modified the node's data
    pub mzxid: i64,
    /// Creation time, milliseconds since the epoch
    pub ctime: i64,
    /// Last modification time, milliseconds since the epoch
    pub mtime: i64,
    /// Data version
    pub version: i32,
    /// Children version
    pub cversion: i32,
    /// ACL version
    pub aversion: i32,
    /// Session owning the node if ephemeral, otherwise 0
    pub ephemeral_owner: i64,
    pub data_length: i32,
    pub num_children: i32,
    /// Transaction id that last modified the children
    pub pzxid: i64,
}

impl Stat {
    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral_owner != 0
    }
}
