//! Advisory locks keyed by entity id

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Serializes operations per keyed entity: edits per snapshot, seals per
/// library. Unsynchronized concurrent seals would race on version-number
/// assignment; concurrent edits would race on the change log.
#[derive(Debug, Default)]
pub struct AdvisoryLocks {
    inner: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl AdvisoryLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, id: Uuid) -> OwnedMutexGuard<()> {
        let lock = self
            .inner
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}
