// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Per-entity mutual exclusion.
//!
//! Two tasks syncing the same entity would both see "no mapping" and both
//! create a remote record. Holding the entity's lock for the whole attempt
//! serializes them; different entities never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use gs_core::EntityType;

type Key = (EntityType, i64);

/// Held for the duration of one entity's sync.
pub type EntityGuard = OwnedMutexGuard<()>;

/// Lazily-created async locks keyed by `(entity_type, local_id)`.
#[derive(Default)]
pub struct EntityLocks {
    locks: Mutex<HashMap<Key, Arc<AsyncMutex<()>>>>,
}

impl EntityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for and take the lock of one entity.
    pub async fn acquire(&self, entity_type: EntityType, local_id: i64) -> EntityGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            // Only the map holds an idle lock
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry((entity_type, local_id)).or_default())
        };
        lock.lock_owned().await
    }

    /// Number of locks currently tracked.
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "locks_tests.rs"]
mod tests;
