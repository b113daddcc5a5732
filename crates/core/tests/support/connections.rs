//! Mock session implementation for testing
//!
//! `MockConnectionProvider` keeps nodes in memory and replays scripted
//! faults: queued acquisition faults are returned by `acquire`, queued
//! operation faults by the next ACL call. Every call is counted.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use keeper_core::{Connection, ConnectionProvider};
use keeper_domain::{Acl, ExpectedVersion, KeeperError, KeeperResult, Stat};
use parking_lot::Mutex;
use tokio::sync::Semaphore;

#[derive(Default)]
struct MockState {
    nodes: Mutex<HashMap<String, (Vec<Acl>, Stat)>>,
    acquire_faults: Mutex<VecDeque<KeeperError>>,
    operation_faults: Mutex<VecDeque<KeeperError>>,
    acquisitions: AtomicU32,
    operations: AtomicU32,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

/// In-memory `ConnectionProvider` with fault scripting.
#[derive(Clone, Default)]
pub struct MockConnectionProvider {
    state: Arc<MockState>,
}

impl MockConnectionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node at the service path `path`.
    pub fn with_node(self, path: &str, acl: Vec<Acl>) -> Self {
        self.seed(path, acl, 0);
        self
    }

    /// Create a node whose ACL version is already `aversion`.
    pub fn seed(&self, path: &str, acl: Vec<Acl>, aversion: i32) {
        let stat = Stat { czxid: 1, mzxid: 1, aversion, ..Stat::default() };
        self.state.nodes.lock().insert(path.to_string(), (acl, stat));
    }

    /// Current ACL and stat at the service path `path`.
    pub fn node(&self, path: &str) -> Option<(Vec<Acl>, Stat)> {
        self.state.nodes.lock().get(path).cloned()
    }

    /// Fail the next `count` acquisitions with `fault`.
    pub fn fail_acquisitions(&self, count: usize, fault: KeeperError) {
        let mut faults = self.state.acquire_faults.lock();
        faults.extend(std::iter::repeat(fault).take(count));
    }

    /// Fail the next `count` ACL operations with `fault`.
    pub fn fail_operations(&self, count: usize, fault: KeeperError) {
        let mut faults = self.state.operation_faults.lock();
        faults.extend(std::iter::repeat(fault).take(count));
    }

    /// Make every operation wait until [`Self::open_gate`] is called.
    pub fn close_gate(&self) {
        *self.state.gate.lock() = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn open_gate(&self) {
        if let Some(gate) = self.state.gate.lock().take() {
            gate.close();
        }
    }

    pub fn acquisitions(&self) -> u32 {
        self.state.acquisitions.load(Ordering::SeqCst)
    }

    pub fn operations(&self) -> u32 {
        self.state.operations.load(Ordering::SeqCst)
    }

    /// Attempts as seen by the retry loop: one acquisition each.
    pub fn attempts(&self) -> u32 {
        self.acquisitions()
    }
}

#[async_trait]
impl ConnectionProvider for MockConnectionProvider {
    async fn acquire(&self) -> KeeperResult<Arc<dyn Connection>> {
        self.state.acquisitions.fetch_add(1, Ordering::SeqCst);
        if let Some(fault) = self.state.acquire_faults.lock().pop_front() {
            return Err(fault);
        }
        Ok(Arc::new(MockConnection { state: Arc::clone(&self.state) }))
    }
}

struct MockConnection {
    state: Arc<MockState>,
}

impl MockConnection {
    async fn begin(&self) -> KeeperResult<()> {
        self.state.operations.fetch_add(1, Ordering::SeqCst);
        let gate = self.state.gate.lock().clone();
        if let Some(gate) = gate {
            // A closed semaphore is the open gate.
            let _ = gate.acquire().await;
        }
        match self.state.operation_faults.lock().pop_front() {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Connection for MockConnection {
    async fn get_acl(&self, path: &str) -> KeeperResult<(Vec<Acl>, Stat)> {
        self.begin().await?;
        self.state.nodes.lock().get(path).cloned().ok_or_else(|| KeeperError::no_node(path))
    }

    async fn set_acl(
        &self,
        path: &str,
        acl: &[Acl],
        version: ExpectedVersion,
    ) -> KeeperResult<Stat> {
        self.begin().await?;
        let mut nodes = self.state.nodes.lock();
        let (current, stat) = nodes.get_mut(path).ok_or_else(|| KeeperError::no_node(path))?;
        if acl.is_empty() {
            return Err(KeeperError::InvalidAcl { path: path.to_string() });
        }
        if !version.matches(stat.aversion) {
            return Err(KeeperError::BadVersion {
                path: path.to_string(),
                expected: version.as_raw(),
                actual: stat.aversion,
            });
        }
        *current = acl.to_vec();
        stat.aversion += 1;
        stat.mzxid += 1;
        Ok(*stat)
    }
}
