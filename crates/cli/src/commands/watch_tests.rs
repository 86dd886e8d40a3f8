// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::commands::testing::TestContext;
use crate::platform::Privacy;
use crate::remote::Method;
use gs_core::{AuditRecord, EntityType};
use tokio::io::AsyncWriteExt;

const INPUT: &str = "\
{\"event\":\"group_saved\",\"group_id\":12}
not an event

{\"event\":\"group_saved\",\"group_id\":12}
{\"event\":\"message_sent\",\"message_id\":7}
";

#[tokio::test(start_paused = true)]
async fn input_events_are_debounced_and_fired_on_close() {
    let ctx = TestContext::new();
    ctx.platform.add_group(12, "Gardeners", Privacy::Public, 1);
    ctx.platform.add_thread(3, "Plots", &[1, 2]);
    ctx.platform.add_message(7, 3, 1, "hello");

    let stats = run_impl(ctx.engine.clone(), INPUT.as_bytes(), std::future::pending())
        .await
        .unwrap();

    assert_eq!(stats.received, 3);
    assert_eq!(stats.coalesced, 1);
    assert_eq!(stats.fired, 2);
    assert_eq!(ctx.transport.requests_for("groups", Method::Post).len(), 1);
    assert_eq!(ctx.transport.requests_for("messages", Method::Post).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_reading_and_drains() {
    let ctx = TestContext::new();
    let (reader, mut writer) = tokio::io::duplex(1024);
    ctx.platform.add_group(12, "Gardeners", Privacy::Public, 1);
    writer
        .write_all(b"{\"event\":\"group_saved\",\"group_id\":12}\n")
        .await
        .unwrap();

    // The writer stays open, so only the shutdown signal ends the loop.
    let shutdown = tokio::time::sleep(Duration::from_millis(10));
    let stats = run_impl(ctx.engine.clone(), BufReader::new(reader), shutdown)
        .await
        .unwrap();

    assert_eq!(stats.received, 1);
    assert_eq!(stats.fired, 1);
    let remote = ctx
        .db(|db| db.get_remote_id(EntityType::Group, 12))
        .await
        .unwrap();
    assert!(remote.is_some());
    drop(writer);
}

#[tokio::test(start_paused = true)]
async fn startup_purges_old_audit_rows() {
    let ctx = TestContext::new();
    let old = Utc::now() - chrono::Duration::days(90);
    ctx.db(|db| {
        db.append_audit(&AuditRecord::success(EntityType::Group, 1, "g-1").with_timestamp(old))
            .unwrap();
    })
    .await;

    // Input stays open until the shutdown timer, well after the first tick.
    let (reader, _writer) = tokio::io::duplex(64);
    run_impl(
        ctx.engine.clone(),
        BufReader::new(reader),
        tokio::time::sleep(Duration::from_millis(1)),
    )
    .await
    .unwrap();

    let left = ctx.db(|db| db.query_audit(10, 0, None)).await.unwrap();
    assert!(left.is_empty());
}

#[tokio::test(start_paused = true)]
async fn huge_retention_keeps_rows_and_keeps_running() {
    let mut config = crate::test_helpers::test_config();
    config.retention.days = u32::MAX;
    let ctx = TestContext::with_config(config);
    let old = Utc::now() - chrono::Duration::days(90);
    ctx.db(|db| {
        db.append_audit(&AuditRecord::success(EntityType::Group, 1, "g-1").with_timestamp(old))
            .unwrap();
    })
    .await;

    let (reader, _writer) = tokio::io::duplex(64);
    run_impl(
        ctx.engine.clone(),
        BufReader::new(reader),
        tokio::time::sleep(Duration::from_millis(1)),
    )
    .await
    .unwrap();

    let left = ctx.db(|db| db.query_audit(10, 0, None)).await.unwrap();
    assert_eq!(left.len(), 1);
}

#[test]
fn second_watcher_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(LOCK_NAME);

    let _held = acquire_lock(&path).unwrap();
    let err = acquire_lock(&path).unwrap_err();
    assert!(matches!(err, Error::AlreadyRunning(_)));
}
