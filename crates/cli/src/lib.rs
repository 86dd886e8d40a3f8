// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! gsrs - one-way sync from a local community platform to a REST backend.
//!
//! This crate provides the engine behind the `gsync` CLI. Groups (with
//! members), message threads (with participants) and messages are pushed to
//! the remote backend, with the local-to-remote identity mapping and an
//! audit trail kept in [`gs_core`].
//!
//! # Main Components
//!
//! - [`SyncEngine`] - pushes one entity per call and reports a [`SyncOutcome`]
//! - [`trigger`] - debounced reaction to local change events
//! - [`platform`] - the boundary to the local community platform
//! - [`remote`] - REST client over an injectable [`Transport`](remote::Transport)
//! - [`Config`] - immutable configuration snapshot loaded from TOML
//!
//! # Wiring
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use gsrs::{Config, SyncEngine};
//! use gsrs::platform::SqlitePlatform;
//! use gsrs::remote::RemoteClient;
//!
//! let config = Config::load(&path)?;
//! let platform = SqlitePlatform::open(&platform_db)?;
//! let client = RemoteClient::from_config(&config.remote)?;
//! let engine = SyncEngine::new(config, Arc::new(platform), client, Database::open(&db_path)?);
//! let outcome = engine.sync_group(12).await;
//! ```

mod cli;
mod commands;
mod display;
mod env;
mod logging;

pub mod config;
pub mod error;
pub mod platform;
pub mod remote;
pub mod sync;
pub mod trigger;

#[cfg(test)]
mod test_helpers;

pub use cli::{BulkTarget, Cli, Command, EntityArgs, OutputFormat, PageArgs};
pub use config::Config;
pub use error::{Error, Result};
pub use sync::{OutcomeKind, SyncEngine, SyncOutcome};

/// Execute a parsed command line. This is the main entry point for the
/// binary and is testable without spawning a process.
pub fn run(cli: Cli) -> Result<()> {
    logging::init(cli.verbose, cli.command.is_long_running());
    let config = commands::load_config(cli.config.as_deref())?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(dispatch(cli.command, config, cli.output, cli.verbose))
}

async fn dispatch(command: Command, config: Config, output: OutputFormat, verbose: bool) -> Result<()> {
    match command {
        Command::Test => commands::test::run(config, output).await,
        Command::Bulk { target, limit } => {
            commands::bulk::run(config, target, limit, output, verbose).await
        }
        Command::Sync { entity } => {
            commands::sync::run(config, entity.entity_type, entity.id, output).await
        }
        Command::Logs { entity_type, page } => {
            commands::logs::run(&config, entity_type, page.limit, page.offset, output)
        }
        Command::Status => commands::status::run(&config, output),
        Command::Inspect { entity } => {
            commands::inspect::run(config, entity.entity_type, entity.id, output).await
        }
        Command::Cleanup { days } => commands::cleanup::run(&config, days, output),
        Command::Watch => commands::watch::run(config).await,
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
