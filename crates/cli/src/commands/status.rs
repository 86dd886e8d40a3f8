// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use serde::Serialize;

use gs_core::{Database, EntityType, SyncDirection};

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::display::format_status_line;
use crate::error::Result;

use super::{open_db, print_json};

#[derive(Debug, Serialize)]
pub(crate) struct TypeStatus {
    pub entity_type: EntityType,
    pub mapped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_success: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StatusReport {
    pub configured: bool,
    pub groups_enabled: bool,
    pub messages_enabled: bool,
    pub realtime: bool,
    pub types: Vec<TypeStatus>,
}

pub fn run(config: &Config, output: OutputFormat) -> Result<()> {
    let db = open_db(config)?;
    let report = collect(&db, config)?;
    print(&report, output)
}

pub(crate) fn collect(db: &Database, config: &Config) -> Result<StatusReport> {
    let types = EntityType::ALL
        .iter()
        .map(|&entity_type| -> Result<TypeStatus> {
            Ok(TypeStatus {
                entity_type,
                mapped: db.count_mappings(entity_type)?,
                last_success: db.last_success_time(Some(entity_type), Some(SyncDirection::Push))?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(StatusReport {
        configured: config.is_configured(),
        groups_enabled: config.sync.groups,
        messages_enabled: config.sync.messages,
        realtime: config.sync.realtime,
        types,
    })
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

fn print(report: &StatusReport, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Text => {
            println!(
                "Remote: {}",
                if report.configured { "configured" } else { "not configured" }
            );
            println!(
                "Groups: {}  Messages: {}  Realtime: {}",
                on_off(report.groups_enabled),
                on_off(report.messages_enabled),
                on_off(report.realtime)
            );
            println!();
            for status in &report.types {
                println!(
                    "{}",
                    format_status_line(status.entity_type, status.mapped, status.last_success.as_ref())
                );
            }
        }
        OutputFormat::Json => print_json(report)?,
    }
    Ok(())
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
