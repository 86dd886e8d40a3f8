// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! gs-core: Durable state for the gsync push engine
//!
//! This crate owns the SQLite schema, the identity mapping between local and
//! remote ids, and the append-only audit log. The `gsync` crate builds the
//! orchestrator, trigger layer, and CLI on top of it.

pub mod audit;
pub mod db;
pub mod entity;
pub mod error;
pub mod mapping;

pub use audit::AuditRecord;
pub use db::Database;
pub use entity::{EntityType, SyncDirection, SyncStatus};
pub use error::{Error, Result};
pub use mapping::Mapping;
