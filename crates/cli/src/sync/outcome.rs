// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync results as values.
//!
//! Nothing a single sync attempt runs into is raised as an error. Every
//! path ends in a [`SyncOutcome`], which callers inspect, print, or count.

use serde::Serialize;
use std::fmt;

use gs_core::EntityType;

/// How a sync attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Pushed to the remote; mapping written or refreshed.
    Synced,
    /// Excluded by policy (privacy tier) or nothing to do.
    Skipped,
    /// Sync not configured, kind disabled, or component inactive.
    Disabled,
    /// A prerequisite identity or parent record is not on the remote.
    DependencyMissing,
    /// Transport failure or non-2xx answer.
    RemoteFailed,
    /// The local entity no longer exists.
    NotFound,
    /// Reading the platform or writing the state database failed.
    StoreFailed,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Synced => "synced",
            OutcomeKind::Skipped => "skipped",
            OutcomeKind::Disabled => "disabled",
            OutcomeKind::DependencyMissing => "dependency_missing",
            OutcomeKind::RemoteFailed => "remote_failed",
            OutcomeKind::NotFound => "not_found",
            OutcomeKind::StoreFailed => "store_failed",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, OutcomeKind::Synced | OutcomeKind::Skipped)
    }

    /// Whether an attempt ending this way leaves a row in the sync log.
    pub fn is_audited(&self) -> bool {
        !matches!(self, OutcomeKind::Disabled | OutcomeKind::Skipped)
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-item counts for a parent's members or participants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MemberTally {
    pub pushed: usize,
    /// No remote identity.
    pub skipped: usize,
    pub failed: usize,
}

/// Result of syncing one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    pub kind: OutcomeKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<MemberTally>,
}

impl SyncOutcome {
    pub fn new(kind: OutcomeKind, message: impl Into<String>) -> Self {
        SyncOutcome {
            kind,
            message: message.into(),
            remote_id: None,
            members: None,
        }
    }

    pub fn synced(remote_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::Synced, message).with_remote_id(Some(remote_id.into()))
    }

    pub fn skipped(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::Skipped, message)
    }

    pub fn disabled(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::Disabled, message)
    }

    pub fn dependency_missing(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::DependencyMissing, message)
    }

    pub fn remote_failed(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::RemoteFailed, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::NotFound, message)
    }

    pub fn store_failed(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::StoreFailed, message)
    }

    /// Sets the remote id (builder pattern).
    pub fn with_remote_id(mut self, remote_id: Option<String>) -> Self {
        self.remote_id = remote_id;
        self
    }

    /// Attaches member counts (builder pattern).
    pub fn with_members(mut self, tally: MemberTally) -> Self {
        self.members = Some(tally);
        self
    }

    /// True for `Synced` and `Skipped`.
    pub fn success(&self) -> bool {
        self.kind.is_success()
    }
}

/// Broadcast after every entity-level sync attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncCompleted {
    pub entity_type: EntityType,
    pub entity_id: i64,
    pub outcome: SyncOutcome,
}

#[cfg(test)]
#[path = "outcome_tests.rs"]
mod tests;
