// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::remote::RemoteError;

/// All possible errors that can occur in the gsrs library.
///
/// Sync outcomes are values, not errors; these cover setup, storage and
/// command-level failures.
#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("config file not found: {0}\n  hint: pass --config or set GSYNC_CONFIG")]
    ConfigNotFound(String),

    #[error("{0}")]
    Core(#[from] gs_core::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("invalid event on line {line}: {reason}")]
    EventParse { line: usize, reason: String },

    #[error("another gsync watch is already running (lock held on {0})")]
    AlreadyRunning(String),

    #[error("sync of {entity} failed: {message}")]
    SyncFailed { entity: String, message: String },

    #[error("bulk sync finished with failures: {succeeded} succeeded, {failed} failed")]
    BulkFailed { succeeded: usize, failed: usize },

    #[error("connectivity test failed: {failed} of {total} checks failed")]
    ChecksFailed { failed: usize, total: usize },
}

/// A specialized Result type for gsrs operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
