// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use serde::Serialize;

use gs_core::Database;

use crate::cli::OutputFormat;
use crate::config::{retention_cutoff, Config};
use crate::error::Result;

use super::{open_db, print_json};

#[derive(Debug, Serialize)]
struct CleanupReport {
    days: u32,
    purged: usize,
}

pub fn run(config: &Config, days: Option<u32>, output: OutputFormat) -> Result<()> {
    let db = open_db(config)?;
    let days = days.unwrap_or(config.retention.days);
    let purged = run_impl(&db, days, Utc::now())?;

    match output {
        OutputFormat::Text => println!("Purged {} sync records older than {} days", purged, days),
        OutputFormat::Json => print_json(&CleanupReport { days, purged })?,
    }
    Ok(())
}

/// Delete audit rows older than `days` before `now`.
pub(crate) fn run_impl(db: &Database, days: u32, now: DateTime<Utc>) -> Result<usize> {
    let Some(cutoff) = retention_cutoff(now, days) else {
        tracing::info!(days, "retention horizon out of range, nothing to purge");
        return Ok(0);
    };
    let purged = db.purge_audit_before(cutoff)?;
    tracing::info!(purged, days, "purged old sync records");
    Ok(purged)
}

#[cfg(test)]
#[path = "cleanup_tests.rs"]
mod tests;
