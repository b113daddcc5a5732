//! Client, execution modes and event delivery

pub mod backgrounding;
pub mod client;
pub mod dispatch;
pub mod event;
pub mod submission;

pub use backgrounding::{Backgroundable, BackgroundCallback, BackgroundContext, Backgrounding};
pub use client::{KeeperClient, KeeperClientBuilder};
pub use dispatch::EventDispatcher;
pub use event::{Event, EventKind};
pub use submission::{BackgroundTask, Submission};
