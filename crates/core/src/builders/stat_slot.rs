use std::sync::Arc;

use keeper_domain::Stat;
use parking_lot::Mutex;

/// Shared cell receiving the stat of a completed read
///
/// Clone the slot, hand one clone to the builder and read the other after
/// the operation (or its callback) has finished. A successful read
/// overwrites any previous value.
#[derive(Debug, Clone, Default)]
pub struct StatSlot(Arc<Mutex<Option<Stat>>>);

impl StatSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Stat> {
        *self.0.lock()
    }

    pub fn take(&self) -> Option<Stat> {
        self.0.lock().take()
    }

    pub(crate) fn store(&self, stat: Stat) {
        *self.0.lock() = Some(stat);
    }
}
