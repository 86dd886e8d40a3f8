// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the transport module.

#![allow(clippy::unwrap_used)]

use super::*;
use crate::test_helpers::MockTransport;
use serde_json::json;

#[test]
fn request_builder_collects_parts() {
    let request = RemoteRequest::new(Method::Patch, "groups")
        .with_query("id", "eq.g-1")
        .with_body(json!({ "name": "n" }))
        .with_prefer("return=representation");

    assert_eq!(request.method, Method::Patch);
    assert_eq!(request.resource, "groups");
    assert_eq!(request.query_value("id"), Some("eq.g-1"));
    assert_eq!(request.query_value("limit"), None);
    assert_eq!(request.prefer.as_deref(), Some("return=representation"));
    assert!(request.body.is_some());
}

#[test]
fn response_success_range() {
    assert!(RemoteResponse::new(200, "").is_success());
    assert!(RemoteResponse::new(204, "").is_success());
    assert!(!RemoteResponse::new(409, "").is_success());
    assert!(!RemoteResponse::new(500, "").is_success());
}

#[test]
fn http_transport_builds_from_config() {
    let config = crate::config::RemoteConfig {
        url: "https://backend.test".into(),
        service_key: "svc".into(),
        ..Default::default()
    };
    let transport = HttpTransport::new(&config).unwrap();
    assert_eq!(transport.base_url, "https://backend.test/rest/v1");
    assert_eq!(transport.api_key, "svc");
}

#[tokio::test]
async fn mock_records_requests() {
    let transport = MockTransport::new();
    let response = transport
        .execute(RemoteRequest::new(Method::Get, "groups").with_query("limit", "1"))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body, "[]");
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn mock_offline_is_transport_error() {
    let transport = MockTransport::new();
    transport.set_offline(true);

    let err = transport
        .execute(RemoteRequest::new(Method::Get, "groups"))
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Transport(_)));
}

#[tokio::test]
async fn mock_injected_failure_runs_out() {
    let transport = MockTransport::new();
    transport.fail_times("groups", Method::Post, 503, 1);

    let first = transport
        .execute(RemoteRequest::new(Method::Post, "groups").with_body(json!({})))
        .await
        .unwrap();
    let second = transport
        .execute(RemoteRequest::new(Method::Post, "groups").with_body(json!({})))
        .await
        .unwrap();

    assert_eq!(first.status, 503);
    assert_eq!(second.status, 201);
}
