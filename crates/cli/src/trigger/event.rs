// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Local mutation events and the jobs they turn into.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use gs_core::EntityType;

use crate::config::TriggerConfig;
use crate::error::{Error, Result};
use crate::sync::MembershipChange;

/// A mutation on the local platform.
///
/// On the wire (the `watch` command's stdin) each event is one JSON object
/// tagged by `event`, e.g. `{"event":"group_saved","group_id":1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LocalEvent {
    GroupSaved { group_id: i64 },
    GroupDeleted { group_id: i64 },
    MembershipSaved { group_id: i64, user_id: i64 },
    MemberRemoved { group_id: i64, user_id: i64 },
    MemberPromoted { group_id: i64, user_id: i64 },
    MemberDemoted { group_id: i64, user_id: i64 },
    MessageSent { message_id: i64 },
    ThreadSaved { thread_id: i64 },
}

impl LocalEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LocalEvent::GroupSaved { .. } => "group_saved",
            LocalEvent::GroupDeleted { .. } => "group_deleted",
            LocalEvent::MembershipSaved { .. } => "membership_saved",
            LocalEvent::MemberRemoved { .. } => "member_removed",
            LocalEvent::MemberPromoted { .. } => "member_promoted",
            LocalEvent::MemberDemoted { .. } => "member_demoted",
            LocalEvent::MessageSent { .. } => "message_sent",
            LocalEvent::ThreadSaved { .. } => "thread_saved",
        }
    }

    /// Parse one JSON line. `line` is 1-based and only used in the error.
    pub fn parse_line(text: &str, line: usize) -> Result<Self> {
        serde_json::from_str(text.trim()).map_err(|e| Error::EventParse {
            line,
            reason: e.to_string(),
        })
    }

    /// The group an event concerns, if any.
    pub fn group_id(&self) -> Option<i64> {
        match *self {
            LocalEvent::GroupSaved { group_id }
            | LocalEvent::GroupDeleted { group_id }
            | LocalEvent::MembershipSaved { group_id, .. }
            | LocalEvent::MemberRemoved { group_id, .. }
            | LocalEvent::MemberPromoted { group_id, .. }
            | LocalEvent::MemberDemoted { group_id, .. } => Some(group_id),
            LocalEvent::MessageSent { .. } | LocalEvent::ThreadSaved { .. } => None,
        }
    }

    /// The deferred job this event asks for.
    pub fn job(&self) -> SyncJob {
        match *self {
            LocalEvent::GroupSaved { group_id } => {
                SyncJob::new(EntityType::Group, group_id, JobAction::Upsert)
            }
            LocalEvent::GroupDeleted { group_id } => {
                SyncJob::new(EntityType::Group, group_id, JobAction::Delete)
            }
            LocalEvent::MembershipSaved { group_id, user_id }
            | LocalEvent::MemberPromoted { group_id, user_id }
            | LocalEvent::MemberDemoted { group_id, user_id } => {
                SyncJob::membership(group_id, user_id, MembershipChange::Add)
            }
            LocalEvent::MemberRemoved { group_id, user_id } => {
                SyncJob::membership(group_id, user_id, MembershipChange::Remove)
            }
            LocalEvent::MessageSent { message_id } => {
                SyncJob::new(EntityType::Message, message_id, JobAction::Upsert)
            }
            LocalEvent::ThreadSaved { thread_id } => {
                SyncJob::new(EntityType::Thread, thread_id, JobAction::Upsert)
            }
        }
    }
}

/// Receives local events from the host platform.
pub trait EventSubscriber: Send + Sync {
    fn on_event(&self, event: LocalEvent);
}

/// Debounce key. Membership jobs are per member so two members of one group
/// never replace each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobKey {
    pub entity_type: EntityType,
    pub entity_id: i64,
    pub member: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobAction {
    Upsert,
    Delete,
    Membership { user_id: i64, change: MembershipChange },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncJob {
    pub key: JobKey,
    pub action: JobAction,
}

impl SyncJob {
    pub fn new(entity_type: EntityType, entity_id: i64, action: JobAction) -> Self {
        SyncJob {
            key: JobKey {
                entity_type,
                entity_id,
                member: None,
            },
            action,
        }
    }

    pub fn membership(group_id: i64, user_id: i64, change: MembershipChange) -> Self {
        SyncJob {
            key: JobKey {
                entity_type: EntityType::Group,
                entity_id: group_id,
                member: Some(user_id),
            },
            action: JobAction::Membership { user_id, change },
        }
    }

    /// How long the job waits before it fires. Deletes never wait.
    pub fn delay(&self, config: &TriggerConfig) -> Duration {
        match self.action {
            JobAction::Delete => Duration::ZERO,
            JobAction::Membership { .. } => config.membership_delay(),
            JobAction::Upsert => match self.key.entity_type {
                EntityType::Group => config.group_delay(),
                EntityType::Thread | EntityType::Message => config.message_delay(),
            },
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
