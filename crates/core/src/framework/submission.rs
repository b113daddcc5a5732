use keeper_common::CommonError;
use keeper_domain::KeeperResult;
use tokio::task::JoinHandle;

/// Result of finalizing a builder
#[derive(Debug)]
pub enum Submission<T> {
    /// Foreground: the operation ran to completion
    Completed(T),
    /// Background: the operation runs on its own task
    Dispatched(BackgroundTask),
}

impl<T> Submission<T> {
    /// The value of a foreground operation
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Dispatched(_) => None,
        }
    }

    /// The task of a background operation
    pub fn into_task(self) -> Option<BackgroundTask> {
        match self {
            Self::Completed(_) => None,
            Self::Dispatched(task) => Some(task),
        }
    }

    pub fn is_dispatched(&self) -> bool {
        matches!(self, Self::Dispatched(_))
    }
}

/// Handle to a dispatched background operation
///
/// Dropping the handle detaches the task; it still runs to completion.
#[derive(Debug)]
pub struct BackgroundTask {
    label: &'static str,
    handle: JoinHandle<()>,
}

impl BackgroundTask {
    pub(crate) fn new(label: &'static str, handle: JoinHandle<()>) -> Self {
        Self { label, handle }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the operation, including its callback, to finish
    ///
    /// Fails only if the task panicked, e.g. inside the callback.
    pub async fn join(self) -> KeeperResult<()> {
        let Self { label, handle } = self;
        handle
            .await
            .map_err(|err| CommonError::task_cancelled_with_reason(label, err.to_string()).into())
    }
}
