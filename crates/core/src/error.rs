// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for gs-core operations.

use thiserror::Error;

/// All possible errors that can occur in gs-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid entity type: '{0}'\n  hint: valid types are: group, thread, message")]
    InvalidEntityType(String),

    #[error("invalid sync direction: '{0}'\n  hint: the only direction is: push")]
    InvalidDirection(String),

    #[error("invalid sync status: '{0}'\n  hint: valid statuses are: success, error")]
    InvalidStatus(String),

    #[error("remote id '{remote_id}' is already mapped to another {entity_type}")]
    MappingConflict {
        entity_type: String,
        remote_id: String,
    },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for gs-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
