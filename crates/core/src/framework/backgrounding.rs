//! Foreground/background execution contract shared by every builder

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::client::KeeperClient;
use super::event::Event;

/// Opaque caller value handed back in the completion event
pub type BackgroundContext = Arc<dyn Any + Send + Sync>;

/// Completion callback, invoked at most once per dispatched operation
pub type BackgroundCallback = Arc<dyn Fn(&KeeperClient, Event) + Send + Sync>;

/// How an operation executes
#[derive(Clone, Default)]
pub enum Backgrounding {
    /// Awaited inline; the result is returned to the caller
    #[default]
    Foreground,
    /// Dispatched to a task; the result reaches the callback, if any
    Background { context: Option<BackgroundContext>, callback: Option<BackgroundCallback> },
}

impl Backgrounding {
    /// Background without context or callback (fire-and-forget)
    pub fn background() -> Self {
        Self::Background { context: None, callback: None }
    }

    pub fn is_background(&self) -> bool {
        matches!(self, Self::Background { .. })
    }

    pub fn context(&self) -> Option<&BackgroundContext> {
        match self {
            Self::Background { context, .. } => context.as_ref(),
            Self::Foreground => None,
        }
    }

    pub fn callback(&self) -> Option<&BackgroundCallback> {
        match self {
            Self::Background { callback, .. } => callback.as_ref(),
            Self::Foreground => None,
        }
    }
}

impl fmt::Debug for Backgrounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Foreground => f.write_str("Foreground"),
            Self::Background { context, callback } => f
                .debug_struct("Background")
                .field("context", &context.is_some())
                .field("callback", &callback.is_some())
                .finish(),
        }
    }
}

pub(crate) mod sealed {
    use super::{BackgroundCallback, BackgroundContext};

    /// Switches a builder to background execution
    ///
    /// Only background states can be expressed, and only this crate can
    /// implement or call it, so a builder never returns to the foreground.
    pub trait Sealed {
        fn set_background(
            &mut self,
            context: Option<BackgroundContext>,
            callback: Option<BackgroundCallback>,
        );
    }
}

/// Backgrounding setters common to all operation builders
///
/// Each setter replaces the previous background configuration entirely.
/// Once any of them has been called the operation runs in the background.
pub trait Backgroundable: sealed::Sealed + Sized {
    /// Run in the background and discard the result
    fn in_background(mut self) -> Self {
        self.set_background(None, None);
        self
    }

    /// Run in the background and discard the result; `context` is kept for
    /// symmetry with the callback variants
    fn in_background_with_context<C>(mut self, context: C) -> Self
    where
        C: Any + Send + Sync,
    {
        self.set_background(Some(Arc::new(context)), None);
        self
    }

    /// Run in the background and deliver the outcome to `callback`
    fn in_background_with_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&KeeperClient, Event) + Send + Sync + 'static,
    {
        self.set_background(None, Some(Arc::new(callback)));
        self
    }

    /// Run in the background and deliver the outcome and `context` to
    /// `callback`
    fn in_background_with_callback_and_context<F, C>(mut self, callback: F, context: C) -> Self
    where
        F: Fn(&KeeperClient, Event) + Send + Sync + 'static,
        C: Any + Send + Sync,
    {
        self.set_background(Some(Arc::new(context)), Some(Arc::new(callback)));
        self
    }
}
