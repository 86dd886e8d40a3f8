// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use super::*;
use crate::config::Config;
use crate::remote::{Method, RemoteClient};
use crate::test_helpers::{test_config, MemoryPlatform, MockTransport};
use gs_core::Database;

fn engine(config: Config) -> (SyncEngine<MockTransport>, MemoryPlatform, MockTransport) {
    let platform = MemoryPlatform::new();
    let transport = MockTransport::new();
    let engine = SyncEngine::new(
        config,
        Arc::new(platform.clone()),
        RemoteClient::new(transport.clone(), "community"),
        Database::open_in_memory().unwrap(),
    );
    (engine, platform, transport)
}

fn names(report: &ConnectivityReport) -> Vec<&'static str> {
    report.checks.iter().map(|c| c.name).collect()
}

#[tokio::test]
async fn healthy_setup_passes_every_check() {
    let (engine, platform, transport) = engine(test_config());
    platform.add_user(1, Some("u-1"));

    let report = engine.test_connectivity().await;

    assert!(report.success);
    assert_eq!(report.failed(), 0);
    assert_eq!(
        names(&report),
        [
            "configuration",
            "remote_api",
            "groups_component",
            "messages_component",
            "user_identity"
        ]
    );
    let gets = transport.requests_for("groups", Method::Get);
    assert_eq!(gets.len(), 1);
    assert_eq!(gets[0].query_value("limit"), Some("1"));
}

#[tokio::test]
async fn user_without_identity_still_passes() {
    let (engine, platform, _transport) = engine(test_config());
    platform.add_user(7, None);

    let report = engine.test_connectivity().await;

    assert!(report.success);
    let identity = report.checks.last().unwrap();
    assert_eq!(identity.name, "user_identity");
    assert!(identity.message.contains("no remote identity"));
}

#[tokio::test]
async fn no_users_omits_identity_check() {
    let (engine, _platform, _transport) = engine(test_config());
    let report = engine.test_connectivity().await;
    assert_eq!(report.checks.len(), 4);
    assert!(report.success);
}

#[tokio::test]
async fn unconfigured_skips_ping() {
    let (engine, _platform, transport) = engine(Config::default());

    let report = engine.test_connectivity().await;

    assert!(!report.success);
    assert_eq!(report.failed(), 2);
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn unreachable_remote_fails_overall() {
    let (engine, _platform, transport) = engine(test_config());
    transport.set_offline(true);

    let report = engine.test_connectivity().await;

    assert!(!report.success);
    let api = &report.checks[1];
    assert!(!api.success);
    assert!(api.message.contains("connection refused"));
}

#[tokio::test]
async fn inactive_component_and_lookup_error_fail() {
    let (engine, platform, _transport) = engine(test_config());
    platform.add_user(1, Some("u-1"));
    platform.set_active(crate::platform::Component::Groups, false);
    platform.set_fail_reads(true);

    let report = engine.test_connectivity().await;

    assert!(!report.success);
    assert_eq!(report.failed(), 2);
    assert!(!report.checks[2].success);
    assert!(!report.checks.last().unwrap().success);
}
