// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use super::*;
use crate::commands::testing::TestContext;
use crate::platform::Privacy;
use crate::remote::Method;
use crate::test_helpers::test_config;

fn seed_groups(ctx: &TestContext, count: i64) {
    for id in 1..=count {
        ctx.platform
            .add_group(id, &format!("Group {id}"), Privacy::Public, 1);
    }
}

#[tokio::test]
async fn groups_default_to_configured_batch() {
    let mut config = test_config();
    config.sync.batch_size = 5;
    let ctx = TestContext::with_config(config);
    seed_groups(&ctx, 8);

    run_impl(&ctx.engine, BulkTarget::Groups, None, OutputFormat::Text, false)
        .await
        .unwrap();
    assert_eq!(ctx.transport.requests_for("groups", Method::Post).len(), 5);
}

#[tokio::test]
async fn explicit_limit_wins() {
    let ctx = TestContext::new();
    seed_groups(&ctx, 4);

    run_impl(&ctx.engine, BulkTarget::Groups, Some(2), OutputFormat::Json, false)
        .await
        .unwrap();
    assert_eq!(ctx.transport.requests_for("groups", Method::Post).len(), 2);
}

#[tokio::test]
async fn item_failures_fail_the_command() {
    let ctx = TestContext::new();
    seed_groups(&ctx, 3);
    ctx.transport.fail_times("groups", Method::Post, 500, 1);

    let err = run_impl(&ctx.engine, BulkTarget::Groups, None, OutputFormat::Text, true)
        .await
        .unwrap_err();
    match err {
        Error::BulkFailed { succeeded, failed } => {
            assert_eq!(succeeded, 2);
            assert_eq!(failed, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn all_is_refused_when_one_kind_is_disabled() {
    let mut config = test_config();
    config.sync.messages = false;
    let ctx = TestContext::with_config(config);
    seed_groups(&ctx, 1);

    let err = run_impl(&ctx.engine, BulkTarget::All, None, OutputFormat::Json, false)
        .await
        .unwrap_err();
    match err {
        Error::SyncFailed { entity, .. } => assert_eq!(entity, "messages"),
        other => panic!("unexpected error: {other}"),
    }
    // The enabled kind still ran.
    assert_eq!(ctx.transport.requests_for("groups", Method::Post).len(), 1);
}

#[tokio::test]
async fn empty_batches_succeed() {
    let ctx = TestContext::new();
    run_impl(&ctx.engine, BulkTarget::All, None, OutputFormat::Text, false)
        .await
        .unwrap();
}
