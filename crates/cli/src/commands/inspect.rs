// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde::Serialize;
use serde_json::Value;

use gs_core::{AuditRecord, Database, EntityType, Mapping};

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::display::{format_audit, format_mapping};
use crate::error::Result;
use crate::remote::{RemoteClient, Resource, Transport};

use super::{open_db, print_json};

/// What the remote backend has for the entity.
#[derive(Debug, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub(crate) enum RemoteView {
    /// No remote lookup was attempted.
    Unavailable { reason: String },
    Found { record: Value },
    Missing,
    Failed { error: String },
}

#[derive(Debug, Serialize)]
pub(crate) struct InspectReport {
    pub entity_type: EntityType,
    pub entity_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping: Option<Mapping>,
    pub history: Vec<AuditRecord>,
    pub remote: RemoteView,
}

pub async fn run(config: Config, entity_type: EntityType, id: i64, output: OutputFormat) -> Result<()> {
    let db = open_db(&config)?;
    let client = if config.is_configured() {
        Some(RemoteClient::from_config(&config.remote)?)
    } else {
        None
    };
    let report = collect(&db, client.as_ref(), entity_type, id).await?;
    print(&report, output)
}

/// Look the entity up by remote id when mapped, by local id otherwise.
pub(crate) async fn collect<T: Transport>(
    db: &Database,
    client: Option<&RemoteClient<T>>,
    entity_type: EntityType,
    id: i64,
) -> Result<InspectReport> {
    let mapping = db.get_mapping(entity_type, id)?;
    let history = db.audit_for_entity(entity_type, id)?;
    let resource = Resource::for_entity(entity_type);

    let remote = match client {
        None => RemoteView::Unavailable {
            reason: "remote is not configured".to_string(),
        },
        Some(client) => {
            let lookup = match &mapping {
                Some(m) => client.get_by_id(resource, &m.remote_id).await,
                None => client
                    .find_by_local_ids(resource, &[id])
                    .await
                    .map(|rows| rows.into_iter().next()),
            };
            match lookup {
                Ok(Some(record)) => RemoteView::Found { record },
                Ok(None) => RemoteView::Missing,
                Err(e) => RemoteView::Failed {
                    error: e.to_string(),
                },
            }
        }
    };

    Ok(InspectReport {
        entity_type,
        entity_id: id,
        mapping,
        history,
        remote,
    })
}

fn print(report: &InspectReport, output: OutputFormat) -> Result<()> {
    if output == OutputFormat::Json {
        return print_json(report);
    }

    println!("{} {}", report.entity_type, report.entity_id);
    match &report.mapping {
        Some(mapping) => {
            for line in format_mapping(mapping) {
                println!("{}", line);
            }
        }
        None => println!("Not mapped"),
    }

    println!();
    println!("History:");
    if report.history.is_empty() {
        println!("  (none)");
    }
    for record in &report.history {
        println!("  {}", format_audit(record));
    }

    println!();
    match &report.remote {
        RemoteView::Unavailable { reason } => println!("Remote: skipped ({})", reason),
        RemoteView::Missing => println!("Remote: no record"),
        RemoteView::Failed { error } => println!("Remote: lookup failed: {}", error),
        RemoteView::Found { record } => {
            println!("Remote:");
            let pretty = serde_json::to_string_pretty(record)?;
            for line in pretty.lines() {
                println!("  {}", line);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "inspect_tests.rs"]
mod tests;
