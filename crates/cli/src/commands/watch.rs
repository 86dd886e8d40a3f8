// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Long-running event loop: JSON-line events on stdin feed the trigger
//! layer until stdin closes or the process is interrupted.

use std::fs::{self, File};
use std::future::Future;
use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::config::{retention_cutoff, Config};
use crate::error::{Error, Result};
use crate::remote::Transport;
use crate::sync::SyncEngine;
use crate::trigger::{EventSubscriber, LocalEvent, TriggerLayer, TriggerStats};

const LOCK_NAME: &str = "watch.lock";

/// Interval between audit retention purges.
const PURGE_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

pub async fn run(config: Config) -> Result<()> {
    let state_dir = config.state_dir();
    fs::create_dir_all(&state_dir)?;
    let _lock = acquire_lock(&state_dir.join(LOCK_NAME))?;

    let engine = super::open_engine(config)?;
    let stdin = BufReader::new(tokio::io::stdin());
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for interrupt");
            std::future::pending::<()>().await;
        }
    };

    run_impl(engine, stdin, shutdown).await?;
    Ok(())
}

/// Hold an exclusive lock for the lifetime of the returned file.
pub(crate) fn acquire_lock(lock_path: &Path) -> Result<File> {
    use fs2::FileExt;

    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(lock_path)?;
    file.try_lock_exclusive()
        .map_err(|_| Error::AlreadyRunning(lock_path.display().to_string()))?;
    Ok(file)
}

/// Internal implementation over any line source and shutdown signal.
pub(crate) async fn run_impl<T, R, S>(engine: SyncEngine<T>, input: R, shutdown: S) -> Result<TriggerStats>
where
    T: Transport + 'static,
    R: AsyncBufRead + Unpin,
    S: Future<Output = ()>,
{
    let (layer, handle) = TriggerLayer::new(engine.clone());
    let layer_task = tokio::spawn(layer.run());

    let mut purge = tokio::time::interval(PURGE_INTERVAL);
    let mut lines = input.lines();
    let mut line_no = 0usize;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(text)) => {
                    line_no += 1;
                    if text.trim().is_empty() {
                        continue;
                    }
                    match LocalEvent::parse_line(&text, line_no) {
                        Ok(event) => handle.on_event(event),
                        Err(e) => tracing::warn!(error = %e, "skipping event"),
                    }
                }
                Ok(None) => {
                    tracing::info!(lines = line_no, "input closed");
                    break;
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to read input");
                    break;
                }
            },
            _ = purge.tick() => purge_audit(&engine).await,
            _ = &mut shutdown => {
                tracing::info!("interrupted, finishing pending jobs");
                break;
            }
        }
    }

    // Closing the last sender lets the layer drain and stop.
    drop(handle);
    let stats = layer_task
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;
    tracing::info!(
        received = stats.received,
        dropped = stats.dropped,
        coalesced = stats.coalesced,
        fired = stats.fired,
        "watch stopped"
    );
    Ok(stats)
}

async fn purge_audit<T: Transport>(engine: &SyncEngine<T>) {
    let days = engine.config().retention.days;
    let Some(cutoff) = retention_cutoff(Utc::now(), days) else {
        tracing::debug!(days, "retention horizon out of range, nothing to purge");
        return;
    };
    match engine.with_db(|db| db.purge_audit_before(cutoff)).await {
        Ok(purged) => tracing::info!(purged, days, "retention purge"),
        Err(e) => tracing::warn!(error = %e, "retention purge failed"),
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
