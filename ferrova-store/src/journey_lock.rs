//! Per-journey write serialization.
//!
//! A booking's read-capacity → allocate → write sequence is a
//! check-then-act race if two requests target the same (train, date)
//! pool. Every capacity pool gets its own async mutex; the coordinator
//! holds it across the whole transaction.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Default)]
pub struct JourneyLocks {
    pools: Mutex<HashMap<(Uuid, NaiveDate), Arc<AsyncMutex<()>>>>,
}

impl JourneyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the single-writer lock for one capacity pool. The guard is
    /// owned so it can be held across transaction awaits. Entries are
    /// never evicted; the map is bounded by trains × journey dates.
    pub async fn acquire(&self, train_id: Uuid, date: NaiveDate) -> OwnedMutexGuard<()> {
        let lock = {
            let mut pools = self.pools.lock().expect("journey lock map poisoned");
            pools.entry((train_id, date)).or_default().clone()
        };
        lock.lock_owned().await
    }
}
