// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared argument structs for CLI commands.
//!
//! These structs are used with `#[command(flatten)]` to reduce duplication
//! across commands that take the same arguments.

use clap::Args;

use gs_core::EntityType;

use super::parse_entity_type;

/// An entity addressed by type and local id.
#[derive(Args, Clone, Debug)]
pub struct EntityArgs {
    /// Entity type (group, thread, message)
    #[arg(value_parser = parse_entity_type)]
    pub entity_type: EntityType,

    /// Local id
    pub id: i64,
}

/// Paging arguments for log output.
#[derive(Args, Clone, Debug)]
pub struct PageArgs {
    /// Maximum number of records
    #[arg(short = 'n', long, default_value_t = 50)]
    pub limit: usize,

    /// Skip this many records first
    #[arg(long, default_value_t = 0)]
    pub offset: usize,
}
