// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use gs_core::EntityType;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::display::format_outcome;
use crate::error::{Error, Result};
use crate::remote::Transport;
use crate::sync::{SyncCompleted, SyncEngine};

use super::{open_engine, print_json};

pub async fn run(config: Config, entity_type: EntityType, id: i64, output: OutputFormat) -> Result<()> {
    let engine = open_engine(config)?;
    run_impl(&engine, entity_type, id, output).await
}

/// Internal implementation that accepts an engine for testing.
pub(crate) async fn run_impl<T: Transport>(
    engine: &SyncEngine<T>,
    entity_type: EntityType,
    id: i64,
    output: OutputFormat,
) -> Result<()> {
    let outcome = engine.sync_entity(entity_type, id).await;

    match output {
        OutputFormat::Text => println!("{}", format_outcome(entity_type, id, &outcome)),
        OutputFormat::Json => print_json(&SyncCompleted {
            entity_type,
            entity_id: id,
            outcome: outcome.clone(),
        })?,
    }

    if outcome.success() {
        Ok(())
    } else {
        Err(Error::SyncFailed {
            entity: format!("{entity_type} {id}"),
            message: outcome.message,
        })
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
