#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use keeper_core::retry::bounded_fixed;
use keeper_core::{Event, KeeperClient};
use keeper_infra::MemoryEnsemble;
use parking_lot::Mutex;

pub type Events = Arc<Mutex<Vec<Event>>>;

/// Client over `ensemble` retrying up to `attempts` times with a 1ms delay.
pub fn client_with_attempts(ensemble: &MemoryEnsemble, attempts: u32) -> KeeperClient {
    KeeperClient::builder(Arc::new(ensemble.clone()))
        .retry_config(bounded_fixed(attempts, Duration::from_millis(1)).expect("valid retry config"))
        .build()
        .expect("client should build")
}

pub fn client(ensemble: &MemoryEnsemble) -> KeeperClient {
    client_with_attempts(ensemble, 3)
}

/// Callback that appends every event to the returned list.
pub fn recorder() -> (Events, impl Fn(&KeeperClient, Event) + Send + Sync + 'static) {
    let events: Events = Arc::default();
    let sink = Arc::clone(&events);
    (events, move |_: &KeeperClient, event: Event| sink.lock().push(event))
}
