// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::sync::{BulkItem, BulkKind, BulkReport, MemberTally, OutcomeKind};
use chrono::TimeZone;

fn at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap()
}

#[test]
fn outcome_with_members() {
    let outcome = SyncOutcome::synced("g-1", "group created").with_members(MemberTally {
        pushed: 2,
        skipped: 1,
        failed: 0,
    });
    assert_eq!(
        format_outcome(EntityType::Group, 12, &outcome),
        "group 12: synced (g-1) group created; members: 2 pushed, 1 skipped, 0 failed"
    );
}

#[test]
fn outcome_without_remote_id() {
    let outcome = SyncOutcome::dependency_missing("sender 4 has no remote identity");
    assert_eq!(
        format_outcome(EntityType::Message, 9, &outcome),
        format!(
            "message 9: {} sender 4 has no remote identity",
            OutcomeKind::DependencyMissing
        )
    );
}

#[test]
fn report_verdict() {
    let report = ConnectivityReport {
        success: false,
        checks: vec![
            CheckResult {
                name: "configuration",
                success: true,
                message: "remote url and service key set".into(),
            },
            CheckResult {
                name: "remote_api",
                success: false,
                message: "connection refused".into(),
            },
        ],
    };
    let lines = format_report(&report);
    assert!(lines[0].starts_with("  ok    configuration"));
    assert!(lines[1].starts_with("  FAIL  remote_api"));
    assert_eq!(lines.last().unwrap(), "1 of 2 checks failed");
}

#[test]
fn bulk_lists_failures_only_unless_verbose() {
    let summary = BulkSummary {
        kind: BulkKind::Groups,
        ok: true,
        message: None,
        report: Some(BulkReport {
            total: 2,
            succeeded: 1,
            failed: 1,
            items: vec![
                BulkItem {
                    id: 1,
                    name: Some("Gardeners".into()),
                    success: true,
                    message: "group created".into(),
                },
                BulkItem {
                    id: 2,
                    name: None,
                    success: false,
                    message: "remote returned 500".into(),
                },
            ],
        }),
    };

    let quiet = format_bulk(&summary, false);
    assert_eq!(quiet[0], "groups: 2 total, 1 succeeded, 1 failed");
    assert_eq!(quiet.len(), 2);
    assert_eq!(quiet[1], "  FAIL  2: remote returned 500");

    let verbose = format_bulk(&summary, true);
    assert_eq!(verbose.len(), 3);
    assert_eq!(verbose[1], "  ok    1 (Gardeners): group created");
}

#[test]
fn bulk_not_run() {
    let summary = BulkSummary {
        kind: BulkKind::Messages,
        ok: false,
        message: Some("message sync is disabled".into()),
        report: None,
    };
    assert_eq!(
        format_bulk(&summary, false),
        vec!["messages: not run: message sync is disabled".to_string()]
    );
}

#[test]
fn audit_lines() {
    let ok = AuditRecord::success(EntityType::Group, 12, "g-1").with_timestamp(at());
    assert_eq!(format_audit(&ok), "2026-03-01 09:30:00  group 12  success  g-1");

    let failed = AuditRecord::failure(EntityType::Message, 7, "remote returned 500").with_timestamp(at());
    assert_eq!(
        format_audit(&failed),
        "2026-03-01 09:30:00  message 7  error  remote returned 500"
    );
}

#[test]
fn status_line_never_synced() {
    let line = format_status_line(EntityType::Thread, 0, None);
    assert!(line.starts_with("thread"));
    assert!(line.ends_with("last success: never"));

    let line = format_status_line(EntityType::Group, 3, Some(&at()));
    assert!(line.contains("3 mapped"));
    assert!(line.ends_with("2026-03-01 09:30:00"));
}
