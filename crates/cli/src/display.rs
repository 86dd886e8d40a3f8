// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};

use gs_core::{AuditRecord, EntityType, Mapping, SyncStatus};

use crate::sync::{BulkSummary, CheckResult, ConnectivityReport, SyncOutcome};

fn format_time(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// One line for a single sync attempt.
///
/// ```text
/// group 12: synced (g-1) group created; members: 2 pushed, 1 skipped, 0 failed
/// ```
pub fn format_outcome(entity_type: EntityType, id: i64, outcome: &SyncOutcome) -> String {
    let mut line = format!("{} {}: {}", entity_type, id, outcome.kind);
    if let Some(remote_id) = &outcome.remote_id {
        line.push_str(&format!(" ({})", remote_id));
    }
    if !outcome.message.is_empty() {
        line.push(' ');
        line.push_str(&outcome.message);
    }
    if let Some(tally) = &outcome.members {
        line.push_str(&format!(
            "; members: {} pushed, {} skipped, {} failed",
            tally.pushed, tally.skipped, tally.failed
        ));
    }
    line
}

pub fn format_check(check: &CheckResult) -> String {
    let mark = if check.success { "ok" } else { "FAIL" };
    format!("  {:<4}  {:<18} {}", mark, check.name, check.message)
}

/// Checks followed by a verdict line.
pub fn format_report(report: &ConnectivityReport) -> Vec<String> {
    let mut lines: Vec<String> = report.checks.iter().map(format_check).collect();
    lines.push(String::new());
    if report.success {
        lines.push(format!("All {} checks passed", report.checks.len()));
    } else {
        lines.push(format!(
            "{} of {} checks failed",
            report.failed(),
            report.checks.len()
        ));
    }
    lines
}

/// Header plus one line per failed item.
///
/// Successful items are only listed when `verbose` is set.
pub fn format_bulk(summary: &BulkSummary, verbose: bool) -> Vec<String> {
    let mut lines = Vec::new();
    let Some(report) = &summary.report else {
        lines.push(format!(
            "{}: not run: {}",
            summary.kind,
            summary.message.as_deref().unwrap_or("refused")
        ));
        return lines;
    };

    lines.push(format!(
        "{}: {} total, {} succeeded, {} failed",
        summary.kind, report.total, report.succeeded, report.failed
    ));
    for item in &report.items {
        if item.success && !verbose {
            continue;
        }
        let mark = if item.success { "ok" } else { "FAIL" };
        let label = match &item.name {
            Some(name) => format!("{} ({})", item.id, name),
            None => item.id.to_string(),
        };
        lines.push(format!("  {:<4}  {}: {}", mark, label, item.message));
    }
    lines
}

/// One audit row, newest-first listings use this.
///
/// ```text
/// 2026-10-19 10:30:00  group 12  success  g-1
/// 2026-10-19 10:31:02  message 7  error  remote returned 500
/// ```
pub fn format_audit(record: &AuditRecord) -> String {
    let detail = match record.status {
        SyncStatus::Success => record.remote_id.clone().unwrap_or_default(),
        SyncStatus::Error => record.error_message.clone().unwrap_or_default(),
    };
    let line = format!(
        "{}  {} {}  {}",
        format_time(&record.synced_at),
        record.entity_type,
        record.entity_id,
        record.status
    );
    if detail.is_empty() {
        line
    } else {
        format!("{}  {}", line, detail)
    }
}

pub fn format_mapping(mapping: &Mapping) -> Vec<String> {
    vec![
        format!("Remote id: {}", mapping.remote_id),
        format!("Mapped: {}", format_time(&mapping.created_at)),
        format!("Last pushed: {}", format_time(&mapping.updated_at)),
    ]
}

/// Status row for one entity type.
pub fn format_status_line(
    entity_type: EntityType,
    mapped: usize,
    last_success: Option<&DateTime<Utc>>,
) -> String {
    let last = last_success.map_or_else(|| "never".to_string(), format_time);
    format!("{:<8} {:>6} mapped   last success: {}", entity_type, mapped, last)
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
