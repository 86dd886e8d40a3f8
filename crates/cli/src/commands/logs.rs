// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use gs_core::{Database, EntityType};

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::display::format_audit;
use crate::error::Result;

use super::{open_db, print_json};

pub fn run(
    config: &Config,
    entity_type: Option<EntityType>,
    limit: usize,
    offset: usize,
    output: OutputFormat,
) -> Result<()> {
    let db = open_db(config)?;
    run_impl(&db, entity_type, limit, offset, output)
}

/// Internal implementation that accepts db for testing.
pub(crate) fn run_impl(
    db: &Database,
    entity_type: Option<EntityType>,
    limit: usize,
    offset: usize,
    output: OutputFormat,
) -> Result<()> {
    let records = db.query_audit(limit, offset, entity_type)?;

    match output {
        OutputFormat::Text => {
            if records.is_empty() {
                println!("No sync records");
            }
            for record in &records {
                println!("{}", format_audit(record));
            }
        }
        OutputFormat::Json => print_json(&records)?,
    }

    Ok(())
}

#[cfg(test)]
#[path = "logs_tests.rs"]
mod tests;
