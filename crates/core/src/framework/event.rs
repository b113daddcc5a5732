use std::any::Any;
use std::fmt;

use keeper_domain::{impl_keyword_conversions, Acl, KeeperError, Stat};

use super::backgrounding::BackgroundContext;

/// Operation an event reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    GetAcl,
    SetAcl,
}

impl_keyword_conversions!(EventKind {
    GetAcl => "get_acl",
    SetAcl => "set_acl",
});

/// Outcome of a background operation, as delivered to its callback
///
/// `path` is the caller-visible path on success and the caller's literal
/// path on error. `name` is the leaf of `path`.
#[derive(Clone)]
pub struct Event {
    pub kind: EventKind,
    pub path: String,
    pub name: String,
    pub err: Option<KeeperError>,
    pub acl: Vec<Acl>,
    pub stat: Option<Stat>,
    pub context: Option<BackgroundContext>,
}

impl Event {
    pub fn is_ok(&self) -> bool {
        self.err.is_none()
    }

    /// The caller context, if it was supplied and is a `T`
    pub fn context_as<T: Any>(&self) -> Option<&T> {
        self.context.as_ref().and_then(|ctx| ctx.downcast_ref::<T>())
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("kind", &self.kind)
            .field("path", &self.path)
            .field("name", &self.name)
            .field("err", &self.err)
            .field("acl", &self.acl)
            .field("stat", &self.stat)
            .field("context", &self.context.is_some())
            .finish()
    }
}
