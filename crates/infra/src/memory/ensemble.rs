use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use keeper_core::paths::validate_path;
use keeper_core::{Connection, ConnectionProvider};
use keeper_domain::constants::{PATH_SEPARATOR, ROOT_PATH, WORLD_ID, WORLD_SCHEME};
use keeper_domain::{Acl, ExpectedVersion, Id, KeeperError, KeeperResult, Perms, Stat};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct Node {
    acl: Vec<Acl>,
    stat: Stat,
}

#[derive(Debug, Default)]
struct FaultQueues {
    acquire: VecDeque<KeeperError>,
    operation: VecDeque<KeeperError>,
}

#[derive(Debug)]
struct EnsembleState {
    nodes: RwLock<BTreeMap<String, Node>>,
    faults: Mutex<FaultQueues>,
    auth: RwLock<Vec<Id>>,
    latency: Mutex<Duration>,
    zxid: AtomicI64,
    session: AtomicI64,
    connected: AtomicBool,
    acquisitions: AtomicU32,
    operations: AtomicU32,
}

impl EnsembleState {
    fn next_zxid(&self) -> i64 {
        self.zxid.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether the session identities grant `perm` on a node with `acl`
    fn permits(&self, acl: &[Acl], perm: Perms) -> bool {
        let auth = self.auth.read();
        acl.iter().filter(|entry| entry.perms.contains(perm)).any(|entry| {
            (entry.id.scheme == WORLD_SCHEME && entry.id.id == WORLD_ID)
                || auth.iter().any(|id| *id == entry.id)
        })
    }
}

/// In-process coordination service
///
/// Cloning is cheap; clones share the same node tree, session and counters.
/// The tree starts with a root node carrying world/ALL.
#[derive(Clone)]
pub struct MemoryEnsemble {
    state: Arc<EnsembleState>,
}

impl Default for MemoryEnsemble {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryEnsemble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryEnsemble")
            .field("nodes", &self.state.nodes.read().len())
            .field("session", &self.session_id())
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl MemoryEnsemble {
    pub fn new() -> Self {
        let root = Node { acl: Acl::open_unsafe(), stat: Stat::default() };
        let mut nodes = BTreeMap::new();
        nodes.insert(ROOT_PATH.to_string(), root);

        Self {
            state: Arc::new(EnsembleState {
                nodes: RwLock::new(nodes),
                faults: Mutex::new(FaultQueues::default()),
                auth: RwLock::new(Vec::new()),
                latency: Mutex::new(Duration::ZERO),
                zxid: AtomicI64::new(0),
                session: AtomicI64::new(1),
                connected: AtomicBool::new(true),
                acquisitions: AtomicU32::new(0),
                operations: AtomicU32::new(0),
            }),
        }
    }

    /// Create the node at `path` under an existing parent
    ///
    /// # Errors
    /// - `InvalidPath` for a malformed path or the root
    /// - `NoNode` naming the parent when it does not exist
    /// - `InvalidAcl` when `acl` is empty
    pub fn create(&self, path: &str, acl: Vec<Acl>) -> KeeperResult<Stat> {
        validate_path(path)?;
        if path == ROOT_PATH {
            return Err(KeeperError::invalid_path(path, "the root always exists"));
        }
        check_acl(path, &acl)?;

        let parent = parent_of(path);
        let mut nodes = self.state.nodes.write();
        if !nodes.contains_key(parent) {
            return Err(KeeperError::no_node(parent));
        }

        let zxid = self.state.next_zxid();
        let now = now_millis();
        let stat = Stat {
            czxid: zxid,
            mzxid: zxid,
            pzxid: zxid,
            ctime: now,
            mtime: now,
            ..Stat::default()
        };

        if let Some(existing) = nodes.get_mut(path) {
            // Recreating keeps the children counters intact.
            existing.acl = acl;
            existing.stat = Stat {
                num_children: existing.stat.num_children,
                cversion: existing.stat.cversion,
                ..stat
            };
            return Ok(existing.stat);
        }

        nodes.insert(path.to_string(), Node { acl, stat });
        if let Some(parent) = nodes.get_mut(parent) {
            parent.stat.num_children += 1;
            parent.stat.cversion += 1;
            parent.stat.pzxid = zxid;
        }
        debug!(path, zxid, "node created");
        Ok(stat)
    }

    /// Create `path` and any missing ancestors
    ///
    /// Ancestors are created with world/ALL; only the leaf receives `acl`.
    pub fn create_all(&self, path: &str, acl: Vec<Acl>) -> KeeperResult<Stat> {
        validate_path(path)?;
        let mut prefix = String::new();
        let segments: Vec<&str> = path[1..].split(PATH_SEPARATOR).collect();
        let Some((_, ancestors)) = segments.split_last() else {
            return Err(KeeperError::invalid_path(path, "the root always exists"));
        };

        for segment in ancestors {
            prefix.push(PATH_SEPARATOR);
            prefix.push_str(segment);
            if !self.exists(&prefix) {
                self.create(&prefix, Acl::open_unsafe())?;
            }
        }
        self.create(path, acl)
    }

    /// Create `path` with world/ALL, returning `self` for chaining
    pub fn with_node(self, path: &str) -> KeeperResult<Self> {
        self.create_all(path, Acl::open_unsafe())?;
        Ok(self)
    }

    pub fn exists(&self, path: &str) -> bool {
        self.state.nodes.read().contains_key(path)
    }

    /// Current ACL of the node at `path`, bypassing sessions and faults
    pub fn acl(&self, path: &str) -> Option<Vec<Acl>> {
        self.state.nodes.read().get(path).map(|node| node.acl.clone())
    }

    /// Current stat of the node at `path`, bypassing sessions and faults
    pub fn stat(&self, path: &str) -> Option<Stat> {
        self.state.nodes.read().get(path).map(|node| node.stat)
    }

    /// Authenticate every session as `id`
    pub fn add_auth(&self, id: Id) {
        let mut auth = self.state.auth.write();
        if !auth.contains(&id) {
            auth.push(id);
        }
    }

    /// Fail the next `count` acquisitions with `fault`
    pub fn fail_acquisitions(&self, count: usize, fault: KeeperError) {
        debug!(count, %fault, "queueing acquisition faults");
        self.state.faults.lock().acquire.extend(std::iter::repeat(fault).take(count));
    }

    /// Fail the next `count` operations with `fault`
    pub fn fail_operations(&self, count: usize, fault: KeeperError) {
        debug!(count, %fault, "queueing operation faults");
        self.state.faults.lock().operation.extend(std::iter::repeat(fault).take(count));
    }

    /// Drop pending scripted faults
    pub fn clear_faults(&self) {
        let mut faults = self.state.faults.lock();
        faults.acquire.clear();
        faults.operation.clear();
    }

    /// Delay every operation by `latency` before it touches the tree
    pub fn set_latency(&self, latency: Duration) {
        *self.state.latency.lock() = latency;
    }

    /// Lose the connection: acquisitions and in-flight handles fail with
    /// `ConnectionLoss` until [`Self::reconnect`]
    pub fn disconnect(&self) {
        warn!(session = self.session_id(), "ensemble disconnected");
        self.state.connected.store(false, Ordering::SeqCst);
    }

    /// Restore the connection, keeping the current session
    pub fn reconnect(&self) {
        debug!(session = self.session_id(), "ensemble reconnected");
        self.state.connected.store(true, Ordering::SeqCst);
    }

    /// Expire the current session
    ///
    /// Handles acquired before the call fail with `SessionExpired`; the next
    /// acquisition opens a new session.
    pub fn expire_session(&self) {
        let expired = self.state.session.fetch_add(1, Ordering::SeqCst);
        warn!(session = expired, "session expired");
    }

    pub fn session_id(&self) -> i64 {
        self.state.session.load(Ordering::SeqCst)
    }

    pub fn is_connected(&self) -> bool {
        self.state.connected.load(Ordering::SeqCst)
    }

    /// Number of `acquire` calls so far, one per retry attempt
    pub fn acquisitions(&self) -> u32 {
        self.state.acquisitions.load(Ordering::SeqCst)
    }

    /// Number of ACL operations issued on acquired handles
    pub fn operations(&self) -> u32 {
        self.state.operations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectionProvider for MemoryEnsemble {
    async fn acquire(&self) -> KeeperResult<Arc<dyn Connection>> {
        self.state.acquisitions.fetch_add(1, Ordering::SeqCst);

        if let Some(fault) = self.state.faults.lock().acquire.pop_front() {
            debug!(%fault, "acquisition failed by script");
            return Err(fault);
        }
        if !self.is_connected() {
            return Err(KeeperError::ConnectionLoss);
        }

        let session = self.session_id();
        Ok(Arc::new(MemoryConnection { state: Arc::clone(&self.state), session }))
    }
}

/// Handle bound to the session that was current when it was acquired
struct MemoryConnection {
    state: Arc<EnsembleState>,
    session: i64,
}

impl MemoryConnection {
    async fn begin(&self, path: &str) -> KeeperResult<()> {
        self.state.operations.fetch_add(1, Ordering::SeqCst);

        let latency = *self.state.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if !self.state.connected.load(Ordering::SeqCst) {
            return Err(KeeperError::ConnectionLoss);
        }
        if self.state.session.load(Ordering::SeqCst) != self.session {
            return Err(KeeperError::SessionExpired);
        }
        if let Some(fault) = self.state.faults.lock().operation.pop_front() {
            debug!(path, %fault, "operation failed by script");
            return Err(fault);
        }
        validate_path(path)
    }
}

#[async_trait]
impl Connection for MemoryConnection {
    async fn get_acl(&self, path: &str) -> KeeperResult<(Vec<Acl>, Stat)> {
        self.begin(path).await?;
        let nodes = self.state.nodes.read();
        let node = nodes.get(path).ok_or_else(|| KeeperError::no_node(path))?;
        Ok((node.acl.clone(), node.stat))
    }

    async fn set_acl(
        &self,
        path: &str,
        acl: &[Acl],
        version: ExpectedVersion,
    ) -> KeeperResult<Stat> {
        self.begin(path).await?;
        check_acl(path, acl)?;

        let mut nodes = self.state.nodes.write();
        let node = nodes.get_mut(path).ok_or_else(|| KeeperError::no_node(path))?;
        if !self.state.permits(&node.acl, Perms::ADMIN) {
            return Err(KeeperError::NoAuth { path: path.to_string() });
        }
        if !version.matches(node.stat.aversion) {
            return Err(KeeperError::BadVersion {
                path: path.to_string(),
                expected: version.as_raw(),
                actual: node.stat.aversion,
            });
        }

        node.acl = acl.to_vec();
        node.stat.aversion += 1;
        self.state.next_zxid();
        Ok(node.stat)
    }
}

/// Reject lists the service would refuse to store
fn check_acl(path: &str, acl: &[Acl]) -> KeeperResult<()> {
    let invalid = acl.is_empty()
        || acl.iter().any(|entry| {
            entry.perms.is_empty()
                || entry.id.scheme.is_empty()
                || (entry.id.scheme == WORLD_SCHEME && entry.id.id != WORLD_ID)
        });
    if invalid {
        return Err(KeeperError::InvalidAcl { path: path.to_string() });
    }
    Ok(())
}

fn parent_of(path: &str) -> &str {
    match path.rfind(PATH_SEPARATOR) {
        Some(0) | None => ROOT_PATH,
        Some(i) => &path[..i],
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
