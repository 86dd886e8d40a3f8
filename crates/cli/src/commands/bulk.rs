// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::cli::{BulkTarget, OutputFormat};
use crate::config::Config;
use crate::display::format_bulk;
use crate::error::{Error, Result};
use crate::remote::Transport;
use crate::sync::{BulkKind, BulkSummary, SyncEngine};

use super::{open_engine, print_json};

pub async fn run(
    config: Config,
    target: BulkTarget,
    limit: Option<usize>,
    output: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let engine = open_engine(config)?;
    run_impl(&engine, target, limit, output, verbose).await
}

/// Internal implementation that accepts an engine for testing.
pub(crate) async fn run_impl<T: Transport>(
    engine: &SyncEngine<T>,
    target: BulkTarget,
    limit: Option<usize>,
    output: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let sync = &engine.config().sync;
    let groups_limit = limit.unwrap_or_else(|| sync.group_batch());
    let messages_limit = limit.unwrap_or(sync.message_batch_size);

    let summaries = match target {
        BulkTarget::Groups => vec![engine.bulk_sync(BulkKind::Groups, groups_limit).await],
        BulkTarget::Messages => vec![engine.bulk_sync(BulkKind::Messages, messages_limit).await],
        BulkTarget::All => {
            let all = engine.bulk_sync_all(groups_limit, messages_limit).await;
            if output == OutputFormat::Json {
                print_json(&all)?;
            }
            vec![all.groups, all.messages]
        }
    };

    match output {
        OutputFormat::Text => {
            for summary in &summaries {
                for line in format_bulk(summary, verbose) {
                    println!("{}", line);
                }
            }
        }
        OutputFormat::Json if target != BulkTarget::All => {
            if let [summary] = summaries.as_slice() {
                print_json(summary)?;
            }
        }
        OutputFormat::Json => {}
    }

    verdict(&summaries)
}

/// A refused batch fails the command, then any failed item does.
fn verdict(summaries: &[BulkSummary]) -> Result<()> {
    if let Some(refused) = summaries.iter().find(|s| !s.ok) {
        return Err(Error::SyncFailed {
            entity: refused.kind.to_string(),
            message: refused.message.clone().unwrap_or_default(),
        });
    }

    let failed: usize = summaries.iter().map(BulkSummary::failed).sum();
    if failed > 0 {
        let succeeded = summaries.iter().map(BulkSummary::succeeded).sum();
        return Err(Error::BulkFailed { succeeded, failed });
    }
    Ok(())
}

#[cfg(test)]
#[path = "bulk_tests.rs"]
mod tests;
