use std::fmt;

use keeper_domain::constants::TRACE_GET_ACL_BACKGROUND;
use keeper_domain::{Acl, KeeperError, KeeperResult, Stat};
use tracing::instrument;

use super::stat_slot::StatSlot;
use crate::framework::backgrounding::sealed::Sealed;
use crate::framework::{
    BackgroundCallback, BackgroundContext, Backgroundable, Backgrounding, EventDispatcher,
    EventKind, KeeperClient, Submission,
};

/// Reads the ACL of a node
pub struct GetAclBuilder {
    client: KeeperClient,
    backgrounding: Backgrounding,
    stat: Option<StatSlot>,
}

impl GetAclBuilder {
    pub(crate) fn new(client: KeeperClient) -> Self {
        Self { client, backgrounding: Backgrounding::Foreground, stat: None }
    }

    /// Capture the node's stat into `slot` when the read succeeds
    pub fn storing_stat_in(mut self, slot: StatSlot) -> Self {
        self.stat = Some(slot);
        self
    }

    /// Run the read against `path`
    ///
    /// In the foreground this returns the ACL list or the final fault. In the
    /// background it returns [`Submission::Dispatched`] at once and never
    /// fails; the outcome goes to the callback, if one was registered.
    #[instrument(skip(self), fields(background = self.backgrounding.is_background()))]
    pub async fn for_path(self, path: &str) -> KeeperResult<Submission<Vec<Acl>>> {
        let Self { client, backgrounding, stat } = self;

        if !backgrounding.is_background() {
            let adjusted = client.namespace().normalize(path)?;
            let (acl, _) = read_acl(&client, &adjusted, stat.as_ref()).await?;
            return Ok(Submission::Completed(acl));
        }

        let given_path = path.to_string();
        let dispatcher = EventDispatcher::new(client.clone(), backgrounding);
        let task_client = client.clone();
        let task = client.spawn_background(TRACE_GET_ACL_BACKGROUND, async move {
            let outcome = async {
                let adjusted = task_client.namespace().normalize(&given_path)?;
                let (acl, stat) = read_acl(&task_client, &adjusted, stat.as_ref()).await?;
                Ok::<_, KeeperError>((adjusted, acl, stat))
            }
            .await;

            let event = match outcome {
                Ok((adjusted, acl, stat)) => {
                    dispatcher.completed(EventKind::GetAcl, &adjusted, acl, Some(stat))
                }
                Err(err) => dispatcher.failed(EventKind::GetAcl, &given_path, err, Vec::new()),
            };
            dispatcher.dispatch(event);
        });

        Ok(Submission::Dispatched(task))
    }
}

async fn read_acl(
    client: &KeeperClient,
    adjusted: &str,
    slot: Option<&StatSlot>,
) -> KeeperResult<(Vec<Acl>, Stat)> {
    client
        .retry_loop()
        .call_with_retry(|connection| async move {
            let (acl, stat) = connection.get_acl(adjusted).await?;
            if let Some(slot) = slot {
                slot.store(stat);
            }
            Ok((acl, stat))
        })
        .await
}

impl Sealed for GetAclBuilder {
    fn set_background(
        &mut self,
        context: Option<BackgroundContext>,
        callback: Option<BackgroundCallback>,
    ) {
        self.backgrounding = Backgrounding::Background { context, callback };
    }
}

impl Backgroundable for GetAclBuilder {}

impl fmt::Debug for GetAclBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetAclBuilder")
            .field("backgrounding", &self.backgrounding)
            .field("stat", &self.stat.is_some())
            .finish_non_exhaustive()
    }
}
