// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod args;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use gs_core::EntityType;

pub use args::{EntityArgs, PageArgs};

/// Output format for reporting commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// What `gsync bulk` runs over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BulkTarget {
    Groups,
    Messages,
    All,
}

/// Parse an entity type argument ("group", "threads", ...).
fn parse_entity_type(s: &str) -> Result<EntityType, String> {
    s.parse::<EntityType>().map_err(|e| e.to_string())
}

const QUICKSTART_HELP: &str = "\
Get started:
  gsync test                   Check configuration and connectivity
  gsync bulk all               Push every group and recent message
  gsync sync group 12          Push one group now
  gsync logs -n 20             Show the latest sync attempts
  gsync watch < events.jsonl   Run the debounced trigger loop";

#[derive(Parser)]
#[command(name = "gsync")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Push a local community platform to a remote REST backend")]
#[command(
    long_about = "Push a local community platform to a remote REST backend.\n\n\
    Groups, memberships, message threads and messages are mirrored one way, \
    with an identity mapping and an audit trail kept in a local SQLite database."
)]
#[command(after_help = QUICKSTART_HELP)]
pub struct Cli {
    /// Config file (default: $GSYNC_CONFIG or ~/.config/gsync/config.toml)
    #[arg(short = 'c', long = "config", global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short = 'o', long = "output", global = true, value_enum, default_value_t)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check configuration, remote reachability, and platform components
    Test,

    /// Sync many entities in one run
    #[command(after_help = "\
Examples:
  gsync bulk groups            Up to the configured batch of groups
  gsync bulk messages -n 200   The 200 most recent messages
  gsync bulk all               Both batches")]
    Bulk {
        /// What to sync
        #[arg(value_enum)]
        target: BulkTarget,

        /// Maximum entities per kind (default: configured batch size)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Sync one entity now
    #[command(arg_required_else_help = true)]
    Sync {
        #[command(flatten)]
        entity: EntityArgs,
    },

    /// Show recorded sync attempts, newest first
    Logs {
        /// Only this entity type
        #[arg(short = 't', long = "type", value_parser = parse_entity_type)]
        entity_type: Option<EntityType>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Show mapping counts and last successful sync per type
    Status,

    /// Show an entity's mapping, audit history, and remote record
    #[command(arg_required_else_help = true)]
    Inspect {
        #[command(flatten)]
        entity: EntityArgs,
    },

    /// Delete audit records older than the retention horizon
    Cleanup {
        /// Retention in days (default: configured retention)
        #[arg(long)]
        days: Option<u32>,
    },

    /// Read JSON-line events on stdin and sync them, debounced
    #[command(after_help = "\
Each stdin line is one event, for example:
  {\"event\":\"group_saved\",\"group_id\":12}
  {\"event\":\"membership_saved\",\"group_id\":12,\"user_id\":7}
  {\"event\":\"message_sent\",\"message_id\":301}")]
    Watch,
}

impl Command {
    /// Commands that keep running and log at info by default.
    pub fn is_long_running(&self) -> bool {
        matches!(self, Command::Watch)
    }
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
