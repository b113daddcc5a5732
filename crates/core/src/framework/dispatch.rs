//! Event construction and delivery for background operations

use keeper_domain::{Acl, KeeperError, Stat};
use tracing::debug;

use super::backgrounding::Backgrounding;
use super::client::KeeperClient;
use super::event::{Event, EventKind};
use crate::paths::node_from_path;

/// Builds the event for a finished background operation and hands it to
/// the registered callback
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    client: KeeperClient,
    backgrounding: Backgrounding,
}

impl EventDispatcher {
    pub fn new(client: KeeperClient, backgrounding: Backgrounding) -> Self {
        Self { client, backgrounding }
    }

    pub fn has_callback(&self) -> bool {
        self.backgrounding.callback().is_some()
    }

    /// Event for a successful operation on the service path `adjusted_path`
    pub fn completed(
        &self,
        kind: EventKind,
        adjusted_path: &str,
        acl: Vec<Acl>,
        stat: Option<Stat>,
    ) -> Event {
        let path = self.client.namespace().denormalize(adjusted_path);
        self.event(kind, path, None, acl, stat)
    }

    /// Event for a failed operation, reported against the caller's literal
    /// path
    pub fn failed(
        &self,
        kind: EventKind,
        given_path: &str,
        err: KeeperError,
        acl: Vec<Acl>,
    ) -> Event {
        self.event(kind, given_path.to_string(), Some(err), acl, None)
    }

    fn event(
        &self,
        kind: EventKind,
        path: String,
        err: Option<KeeperError>,
        acl: Vec<Acl>,
        stat: Option<Stat>,
    ) -> Event {
        Event {
            kind,
            name: node_from_path(&path).to_string(),
            path,
            err,
            acl,
            stat,
            context: self.backgrounding.context().cloned(),
        }
    }

    /// Invoke the callback with `event`; returns whether one was registered
    pub fn dispatch(&self, event: Event) -> bool {
        match self.backgrounding.callback() {
            Some(callback) => {
                callback(&self.client, event);
                true
            }
            None => {
                if let Some(err) = &event.err {
                    debug!(kind = %event.kind, path = %event.path, error = %err,
                        "Background operation failed with no callback registered");
                }
                false
            }
        }
    }
}
