// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Manual batch runs over many entities.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use gs_core::EntityType;

use super::engine::SyncEngine;
use crate::error::{Error, Result};
use crate::remote::Transport;

/// Entity family a batch runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkKind {
    Groups,
    Messages,
}

impl BulkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BulkKind::Groups => "groups",
            BulkKind::Messages => "messages",
        }
    }

    pub fn entity_type(&self) -> EntityType {
        match self {
            BulkKind::Groups => EntityType::Group,
            BulkKind::Messages => EntityType::Message,
        }
    }
}

impl fmt::Display for BulkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BulkKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "groups" => Ok(BulkKind::Groups),
            "messages" => Ok(BulkKind::Messages),
            _ => Err(Error::Config(format!("unknown bulk kind '{s}'"))),
        }
    }
}

/// Result line for one entity in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkItem {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub items: Vec<BulkItem>,
}

impl BulkReport {
    fn push(&mut self, item: BulkItem) {
        self.total += 1;
        if item.success {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.items.push(item);
    }
}

/// A batch over one kind.
///
/// `ok` says whether the batch ran, not whether every item succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkSummary {
    pub kind: BulkKind,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<BulkReport>,
}

impl BulkSummary {
    fn refused(kind: BulkKind, message: impl Into<String>) -> Self {
        BulkSummary {
            kind,
            ok: false,
            message: Some(message.into()),
            report: None,
        }
    }

    /// Items that failed, zero when the batch did not run.
    pub fn failed(&self) -> usize {
        self.report.as_ref().map_or(0, |r| r.failed)
    }

    pub fn succeeded(&self) -> usize {
        self.report.as_ref().map_or(0, |r| r.succeeded)
    }
}

/// Both batches of a full run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkAllSummary {
    pub ok: bool,
    pub groups: BulkSummary,
    pub messages: BulkSummary,
}

impl<T: Transport> SyncEngine<T> {
    /// Sync up to `limit` entities of one kind, one at a time.
    ///
    /// Item failures are counted; they never stop the batch.
    pub async fn bulk_sync(&self, kind: BulkKind, limit: usize) -> BulkSummary {
        if let Some(closed) = self.gate(kind.entity_type()) {
            return BulkSummary::refused(kind, closed.message);
        }

        let mut report = BulkReport::default();
        match kind {
            BulkKind::Groups => {
                let groups = match self.platform().list_groups(limit, 0) {
                    Ok(groups) => groups,
                    Err(e) => return BulkSummary::refused(kind, format!("failed to list groups: {e}")),
                };
                for group in groups {
                    let outcome = self.sync_group(group.id).await;
                    report.push(BulkItem {
                        id: group.id,
                        name: Some(group.name),
                        success: outcome.success(),
                        message: outcome.message,
                    });
                }
            }
            BulkKind::Messages => {
                let messages = match self.platform().recent_messages(limit, 0) {
                    Ok(messages) => messages,
                    Err(e) => {
                        return BulkSummary::refused(kind, format!("failed to list messages: {e}"))
                    }
                };
                for message in messages {
                    let outcome = self.sync_message(message.id).await;
                    report.push(BulkItem {
                        id: message.id,
                        name: None,
                        success: outcome.success(),
                        message: outcome.message,
                    });
                }
            }
        }

        tracing::info!(
            %kind,
            total = report.total,
            succeeded = report.succeeded,
            failed = report.failed,
            "bulk sync finished"
        );
        BulkSummary {
            kind,
            ok: true,
            message: None,
            report: Some(report),
        }
    }

    /// Groups then messages, each batch independent of the other.
    pub async fn bulk_sync_all(&self, groups_limit: usize, messages_limit: usize) -> BulkAllSummary {
        let groups = self.bulk_sync(BulkKind::Groups, groups_limit).await;
        let messages = self.bulk_sync(BulkKind::Messages, messages_limit).await;
        BulkAllSummary {
            ok: groups.ok && messages.ok,
            groups,
            messages,
        }
    }
}

#[cfg(test)]
#[path = "bulk_tests.rs"]
mod tests;
