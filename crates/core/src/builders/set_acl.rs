use std::fmt;
use std::sync::Arc;

use keeper_domain::constants::TRACE_SET_ACL_BACKGROUND;
use keeper_domain::{Acl, ExpectedVersion, KeeperError, KeeperResult, Stat};
use tracing::instrument;

use crate::acl::AclProvider;
use crate::framework::backgrounding::sealed::Sealed;
use crate::framework::{
    BackgroundCallback, BackgroundContext, Backgroundable, Backgrounding, EventDispatcher,
    EventKind, KeeperClient, Submission,
};

/// ACL entries for a write, and the provider that supplies them when the
/// caller gave none
#[derive(Debug, Clone)]
pub struct Acling {
    acl: Option<Vec<Acl>>,
    provider: Arc<dyn AclProvider>,
}

impl Acling {
    pub fn new(acl: Option<Vec<Acl>>, provider: Arc<dyn AclProvider>) -> Self {
        Self { acl, provider }
    }

    /// Explicitly configured entries, if any
    pub fn explicit(&self) -> Option<&[Acl]> {
        self.acl.as_deref()
    }

    /// Entries to send for `path` (caller-visible)
    ///
    /// Explicit entries are used as given, even when empty. Provider entries
    /// must be non-empty.
    pub fn resolve(&self, path: &str) -> KeeperResult<Vec<Acl>> {
        if let Some(acl) = &self.acl {
            return Ok(acl.clone());
        }
        let acl = self.provider.acl_for_path(path);
        if acl.is_empty() {
            return Err(KeeperError::missing_option(format!("acl for {path}")));
        }
        Ok(acl)
    }
}

/// Replaces the ACL of a node
pub struct SetAclBuilder {
    client: KeeperClient,
    backgrounding: Backgrounding,
    acling: Acling,
    version: ExpectedVersion,
}

impl SetAclBuilder {
    pub(crate) fn new(client: KeeperClient) -> Self {
        let acling = Acling::new(None, Arc::clone(client.acl_provider()));
        Self {
            client,
            backgrounding: Backgrounding::Foreground,
            acling,
            version: ExpectedVersion::Any,
        }
    }

    /// Entries to set; without this the client's ACL provider decides
    pub fn with_acl(mut self, acl: impl IntoIterator<Item = Acl>) -> Self {
        self.acling =
            Acling::new(Some(acl.into_iter().collect()), Arc::clone(self.client.acl_provider()));
        self
    }

    /// Only apply if the node's ACL version matches; negative raw values
    /// mean any version
    pub fn with_version(mut self, version: impl Into<ExpectedVersion>) -> Self {
        self.version = version.into();
        self
    }

    /// Run the write against `path`
    ///
    /// In the foreground this returns the node's new stat or the final
    /// fault. In the background it returns [`Submission::Dispatched`] at once
    /// and never fails; the outcome goes to the callback, if one was
    /// registered.
    #[instrument(skip(self), fields(background = self.backgrounding.is_background(), version = %self.version))]
    pub async fn for_path(self, path: &str) -> KeeperResult<Submission<Stat>> {
        let Self { client, backgrounding, acling, version } = self;

        if !backgrounding.is_background() {
            let adjusted = client.namespace().normalize(path)?;
            let acl = acling.resolve(path)?;
            let stat = write_acl(&client, &adjusted, &acl, version).await?;
            return Ok(Submission::Completed(stat));
        }

        let given_path = path.to_string();
        let dispatcher = EventDispatcher::new(client.clone(), backgrounding);
        let task_client = client.clone();
        let task = client.spawn_background(TRACE_SET_ACL_BACKGROUND, async move {
            let mut acl = acling.explicit().map(<[Acl]>::to_vec).unwrap_or_default();
            let outcome = async {
                let adjusted = task_client.namespace().normalize(&given_path)?;
                acl = acling.resolve(&given_path)?;
                let stat = write_acl(&task_client, &adjusted, &acl, version).await?;
                Ok::<_, KeeperError>((adjusted, stat))
            }
            .await;

            let event = match outcome {
                Ok((adjusted, stat)) => {
                    dispatcher.completed(EventKind::SetAcl, &adjusted, acl, Some(stat))
                }
                Err(err) => dispatcher.failed(EventKind::SetAcl, &given_path, err, acl),
            };
            dispatcher.dispatch(event);
        });

        Ok(Submission::Dispatched(task))
    }
}

async fn write_acl(
    client: &KeeperClient,
    adjusted: &str,
    acl: &[Acl],
    version: ExpectedVersion,
) -> KeeperResult<Stat> {
    client
        .retry_loop()
        .call_with_retry(|connection| async move { connection.set_acl(adjusted, acl, version).await })
        .await
}

impl Sealed for SetAclBuilder {
    fn set_background(
        &mut self,
        context: Option<BackgroundContext>,
        callback: Option<BackgroundCallback>,
    ) {
        self.backgrounding = Backgrounding::Background { context, callback };
    }
}

impl Backgroundable for SetAclBuilder {}

impl fmt::Debug for SetAclBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetAclBuilder")
            .field("backgrounding", &self.backgrounding)
            .field("acling", &self.acling)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use keeper_domain::{FaultClass, Perms};

    use super::*;
    use crate::acl::DefaultAclProvider;

    #[test]
    fn test_explicit_entries_win() {
        let acling = Acling::new(
            Some(vec![Acl::world(Perms::READ)]),
            Arc::new(DefaultAclProvider::default()),
        );
        assert_eq!(acling.resolve("/a").unwrap(), vec![Acl::world(Perms::READ)]);
    }

    #[test]
    fn test_explicit_empty_list_passes_through() {
        let acling = Acling::new(Some(Vec::new()), Arc::new(DefaultAclProvider::default()));
        assert_eq!(acling.resolve("/a").unwrap(), Vec::new());
    }

    #[test]
    fn test_provider_fills_in() {
        let acling = Acling::new(None, Arc::new(DefaultAclProvider::default()));
        assert_eq!(acling.resolve("/a").unwrap(), Acl::open_unsafe());
        assert!(acling.explicit().is_none());
    }

    #[test]
    fn test_empty_provider_is_missing_option() {
        let acling = Acling::new(None, Arc::new(DefaultAclProvider::new(Vec::new())));
        let err = acling.resolve("/a").unwrap_err();
        assert_eq!(err, KeeperError::MissingOption("acl for /a".into()));
        assert_eq!(err.class(), FaultClass::Configuration);
    }
}
