// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

#[tokio::test]
async fn same_entity_waits() {
    let locks = Arc::new(EntityLocks::new());
    let guard = locks.acquire(EntityType::Group, 1).await;

    let waiter = {
        let locks = Arc::clone(&locks);
        tokio::spawn(async move {
            let _guard = locks.acquire(EntityType::Group, 1).await;
        })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!waiter.is_finished());

    drop(guard);
    assert!(waiter.await.is_ok());
}

#[tokio::test]
async fn different_entities_do_not_contend() {
    let locks = EntityLocks::new();
    let _group = locks.acquire(EntityType::Group, 1).await;
    let _other = locks.acquire(EntityType::Group, 2).await;
    let _thread = locks.acquire(EntityType::Thread, 1).await;
    assert_eq!(locks.len(), 3);
}

#[tokio::test]
async fn idle_locks_are_pruned() {
    let locks = EntityLocks::new();
    drop(locks.acquire(EntityType::Group, 1).await);
    drop(locks.acquire(EntityType::Message, 2).await);
    let _held = locks.acquire(EntityType::Thread, 3).await;
    assert_eq!(locks.len(), 1);
    assert!(!locks.is_empty());
}
