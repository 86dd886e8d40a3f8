// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The sync orchestrator.
//!
//! [`SyncEngine`] pushes one local entity (and its members or participants)
//! to the remote backend per call. The flow for each entity is:
//!
//! ```text
//! gate -> read local -> privacy policy -> dependencies
//!      -> update (mapped) | create + write mapping (unmapped)
//!      -> sub-items -> audit row -> SyncCompleted broadcast
//! ```
//!
//! Failures come back as [`SyncOutcome`] values. The state database sits
//! behind an async mutex that is never held across a remote call.

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex as AsyncMutex};

use gs_core::{AuditRecord, Database, EntityType};

use super::locks::EntityLocks;
use super::outcome::{MemberTally, OutcomeKind, SyncCompleted, SyncOutcome};
use crate::config::Config;
use crate::error::Result;
use crate::platform::{Component, Group, LocalPlatform, Message, Thread};
use crate::remote::{HttpTransport, RemoteClient, Transport};

/// Capacity of the completion broadcast. Slow listeners see `Lagged`.
const COMPLETION_CAPACITY: usize = 256;

/// A single-member change on a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipChange {
    /// Joined, or role changed.
    Add,
    Remove,
}

struct Inner<T: Transport> {
    config: Config,
    platform: Arc<dyn LocalPlatform>,
    client: RemoteClient<T>,
    db: AsyncMutex<Database>,
    locks: EntityLocks,
    completed: broadcast::Sender<SyncCompleted>,
}

/// Pushes local entities to the remote backend.
///
/// Cheap to clone; clones share the database handle, locks and broadcast.
pub struct SyncEngine<T: Transport = HttpTransport> {
    inner: Arc<Inner<T>>,
}

impl<T: Transport> Clone for SyncEngine<T> {
    fn clone(&self) -> Self {
        SyncEngine {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport> SyncEngine<T> {
    pub fn new(
        config: Config,
        platform: Arc<dyn LocalPlatform>,
        client: RemoteClient<T>,
        db: Database,
    ) -> Self {
        let (completed, _) = broadcast::channel(COMPLETION_CAPACITY);
        SyncEngine {
            inner: Arc::new(Inner {
                config,
                platform,
                client,
                db: AsyncMutex::new(db),
                locks: EntityLocks::new(),
                completed,
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn platform(&self) -> &dyn LocalPlatform {
        self.inner.platform.as_ref()
    }

    pub fn client(&self) -> &RemoteClient<T> {
        &self.inner.client
    }

    /// Listen for completed entity syncs.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncCompleted> {
        self.inner.completed.subscribe()
    }

    /// Run a closure against the state database.
    pub async fn with_db<R>(&self, f: impl FnOnce(&Database) -> R) -> R {
        let db = self.inner.db.lock().await;
        f(&db)
    }

    /// Whether an entity kind may sync at all right now.
    pub fn can_sync(&self, entity_type: EntityType) -> bool {
        self.gate(entity_type).is_none()
    }

    /// Whether a group's privacy falls inside the configured tier.
    pub fn should_sync_group(&self, group: &Group) -> bool {
        self.inner.config.sync.group_privacy.allows(group.privacy)
    }

    /// `Some(Disabled)` when configuration, kind toggle, or component state
    /// closes the gate for this kind.
    pub(super) fn gate(&self, entity_type: EntityType) -> Option<SyncOutcome> {
        let config = &self.inner.config;
        if !config.is_configured() {
            return Some(SyncOutcome::disabled("remote sync is not configured"));
        }
        let (enabled, component) = match entity_type {
            EntityType::Group => (config.sync.groups, Component::Groups),
            EntityType::Thread | EntityType::Message => (config.sync.messages, Component::Messages),
        };
        if !enabled {
            return Some(SyncOutcome::disabled(format!(
                "{} sync is disabled",
                component.as_str()
            )));
        }
        if !self.platform().is_active(component) {
            return Some(SyncOutcome::disabled(format!(
                "{} component is not active",
                component.as_str()
            )));
        }
        None
    }

    /// Dispatch on entity type.
    pub async fn sync_entity(&self, entity_type: EntityType, id: i64) -> SyncOutcome {
        match entity_type {
            EntityType::Group => self.sync_group(id).await,
            EntityType::Thread => self.sync_thread(id).await,
            EntityType::Message => self.sync_message(id).await,
        }
    }

    pub async fn sync_group(&self, group_id: i64) -> SyncOutcome {
        let outcome = match self.gate(EntityType::Group) {
            Some(closed) => closed,
            None => {
                let _guard = self.inner.locks.acquire(EntityType::Group, group_id).await;
                self.push_group(group_id).await
            }
        };
        self.finish(EntityType::Group, group_id, outcome).await
    }

    pub async fn sync_thread(&self, thread_id: i64) -> SyncOutcome {
        let outcome = match self.gate(EntityType::Thread) {
            Some(closed) => closed,
            None => {
                let _guard = self.inner.locks.acquire(EntityType::Thread, thread_id).await;
                self.push_thread(thread_id).await
            }
        };
        self.finish(EntityType::Thread, thread_id, outcome).await
    }

    /// Push one message. An unmapped thread is synced first, in this call.
    pub async fn sync_message(&self, message_id: i64) -> SyncOutcome {
        let outcome = match self.gate(EntityType::Message) {
            Some(closed) => closed,
            None => {
                let _guard = self
                    .inner
                    .locks
                    .acquire(EntityType::Message, message_id)
                    .await;
                self.push_message(message_id).await
            }
        };
        self.finish(EntityType::Message, message_id, outcome).await
    }

    /// Remove a group from the remote.
    ///
    /// The mapping is dropped only after the remote confirms the delete, so a
    /// failed delete can be retried by the next event.
    pub async fn delete_group(&self, group_id: i64) -> SyncOutcome {
        let outcome = match self.gate(EntityType::Group) {
            Some(closed) => closed,
            None => {
                let _guard = self.inner.locks.acquire(EntityType::Group, group_id).await;
                self.remove_group(group_id).await
            }
        };
        self.finish(EntityType::Group, group_id, outcome).await
    }

    /// Push a single membership change. Writes no audit row.
    pub async fn sync_membership(
        &self,
        group_id: i64,
        user_id: i64,
        change: MembershipChange,
    ) -> SyncOutcome {
        if let Some(closed) = self.gate(EntityType::Group) {
            return closed;
        }
        let _guard = self.inner.locks.acquire(EntityType::Group, group_id).await;
        let outcome = self.push_membership(group_id, user_id, change).await;
        match outcome.kind {
            OutcomeKind::Synced => {
                tracing::debug!(group_id, user_id, ?change, "membership synced")
            }
            _ => tracing::warn!(
                group_id,
                user_id,
                ?change,
                kind = %outcome.kind,
                message = %outcome.message,
                "membership not synced"
            ),
        }
        outcome
    }

    async fn push_group(&self, group_id: i64) -> SyncOutcome {
        let group = match self.platform().get_group(group_id) {
            Ok(Some(group)) => group,
            Ok(None) => return SyncOutcome::not_found(format!("group {group_id} not found")),
            Err(e) => return SyncOutcome::store_failed(format!("failed to read group {group_id}: {e}")),
        };

        if !self.should_sync_group(&group) {
            return SyncOutcome::skipped(format!(
                "group privacy '{}' is outside the '{}' tier",
                group.privacy, self.inner.config.sync.group_privacy
            ));
        }

        let creator = match self.platform().remote_user_id(group.creator_id) {
            Ok(Some(creator)) => creator,
            Ok(None) => {
                return SyncOutcome::dependency_missing(format!(
                    "group creator {} has no remote identity",
                    group.creator_id
                ))
            }
            Err(e) => {
                return SyncOutcome::store_failed(format!(
                    "failed to look up creator {}: {e}",
                    group.creator_id
                ))
            }
        };

        let remote_id = match self.mapped(EntityType::Group, group_id).await {
            Ok(Some(remote_id)) => {
                if let Err(e) = self.inner.client.update_group(&remote_id, &group).await {
                    return SyncOutcome::remote_failed(format!("failed to update group: {e}"))
                        .with_remote_id(Some(remote_id));
                }
                remote_id
            }
            Ok(None) => match self.inner.client.create_group(&group, &creator).await {
                Ok(remote_id) => remote_id,
                Err(e) => return SyncOutcome::remote_failed(format!("failed to create group: {e}")),
            },
            Err(e) => return SyncOutcome::store_failed(format!("failed to read mapping: {e}")),
        };

        if let Err(outcome) = self.record_mapping(EntityType::Group, group_id, &remote_id).await {
            return outcome;
        }

        let members = self.push_group_members(&group, &remote_id).await;
        SyncOutcome::synced(remote_id, "group synced").with_members(members)
    }

    async fn push_group_members(&self, group: &Group, group_remote_id: &str) -> MemberTally {
        let mut tally = MemberTally::default();
        let members = match self.platform().group_members(group.id) {
            Ok(members) => members,
            Err(e) => {
                tracing::warn!(group_id = group.id, error = %e, "failed to list group members");
                return tally;
            }
        };
        let user_ids: Vec<i64> = members.iter().map(|m| m.user_id).collect();
        let identities = match self.platform().remote_user_ids(&user_ids) {
            Ok(identities) => identities,
            Err(e) => {
                tracing::warn!(group_id = group.id, error = %e, "failed to look up member identities");
                tally.failed = members.len();
                return tally;
            }
        };

        for member in members {
            let Some(user_remote_id) = identities.get(&member.user_id) else {
                tracing::warn!(
                    group_id = group.id,
                    user_id = member.user_id,
                    "member has no remote identity, skipping"
                );
                tally.skipped += 1;
                continue;
            };
            match self
                .inner
                .client
                .upsert_group_member(group_remote_id, user_remote_id, member.user_id, member.role)
                .await
            {
                Ok(()) => tally.pushed += 1,
                Err(e) => {
                    tracing::warn!(
                        group_id = group.id,
                        user_id = member.user_id,
                        error = %e,
                        "failed to push group member"
                    );
                    tally.failed += 1;
                }
            }
        }
        tally
    }

    async fn push_thread(&self, thread_id: i64) -> SyncOutcome {
        let thread = match self.platform().get_thread(thread_id) {
            Ok(Some(thread)) => thread,
            Ok(None) => return SyncOutcome::not_found(format!("thread {thread_id} not found")),
            Err(e) => {
                return SyncOutcome::store_failed(format!("failed to read thread {thread_id}: {e}"))
            }
        };

        let remote_id = match self.mapped(EntityType::Thread, thread_id).await {
            Ok(Some(remote_id)) => {
                if let Err(e) = self.inner.client.update_thread(&remote_id, &thread).await {
                    return SyncOutcome::remote_failed(format!("failed to update thread: {e}"))
                        .with_remote_id(Some(remote_id));
                }
                remote_id
            }
            Ok(None) => match self.inner.client.create_thread(&thread).await {
                Ok(remote_id) => remote_id,
                Err(e) => return SyncOutcome::remote_failed(format!("failed to create thread: {e}")),
            },
            Err(e) => return SyncOutcome::store_failed(format!("failed to read mapping: {e}")),
        };

        if let Err(outcome) = self.record_mapping(EntityType::Thread, thread_id, &remote_id).await {
            return outcome;
        }

        let participants = self.push_participants(&thread, &remote_id).await;
        SyncOutcome::synced(remote_id, "thread synced").with_members(participants)
    }

    async fn push_participants(&self, thread: &Thread, thread_remote_id: &str) -> MemberTally {
        let mut tally = MemberTally::default();
        let identities = match self.platform().remote_user_ids(&thread.participants) {
            Ok(identities) => identities,
            Err(e) => {
                tracing::warn!(thread_id = thread.id, error = %e, "failed to look up participant identities");
                tally.failed = thread.participants.len();
                return tally;
            }
        };

        for &user_id in &thread.participants {
            let Some(user_remote_id) = identities.get(&user_id) else {
                tracing::warn!(
                    thread_id = thread.id,
                    user_id,
                    "participant has no remote identity, skipping"
                );
                tally.skipped += 1;
                continue;
            };
            match self
                .inner
                .client
                .upsert_thread_participant(thread_remote_id, user_remote_id, user_id)
                .await
            {
                Ok(()) => tally.pushed += 1,
                Err(e) => {
                    tracing::warn!(thread_id = thread.id, user_id, error = %e, "failed to push participant");
                    tally.failed += 1;
                }
            }
        }
        tally
    }

    async fn push_message(&self, message_id: i64) -> SyncOutcome {
        let message: Message = match self.platform().get_message(message_id) {
            Ok(Some(message)) => message,
            Ok(None) => return SyncOutcome::not_found(format!("message {message_id} not found")),
            Err(e) => {
                return SyncOutcome::store_failed(format!("failed to read message {message_id}: {e}"))
            }
        };

        let sender = match self.platform().remote_user_id(message.sender_id) {
            Ok(Some(sender)) => sender,
            Ok(None) => {
                return SyncOutcome::dependency_missing(format!(
                    "sender {} has no remote identity",
                    message.sender_id
                ))
            }
            Err(e) => {
                return SyncOutcome::store_failed(format!(
                    "failed to look up sender {}: {e}",
                    message.sender_id
                ))
            }
        };

        let thread_remote_id = match self.mapped(EntityType::Thread, message.thread_id).await {
            Ok(Some(remote_id)) => remote_id,
            Ok(None) => {
                tracing::debug!(
                    message_id,
                    thread_id = message.thread_id,
                    "thread not mapped, syncing it first"
                );
                let thread = self.sync_thread(message.thread_id).await;
                match (thread.success(), thread.remote_id) {
                    (true, Some(remote_id)) => remote_id,
                    _ => {
                        return SyncOutcome::dependency_missing(format!(
                            "thread {} could not be synced: {}",
                            message.thread_id, thread.message
                        ))
                    }
                }
            }
            Err(e) => return SyncOutcome::store_failed(format!("failed to read thread mapping: {e}")),
        };

        let remote_id = match self.mapped(EntityType::Message, message_id).await {
            Ok(Some(remote_id)) => {
                if let Err(e) = self.inner.client.update_message(&remote_id, &message).await {
                    return SyncOutcome::remote_failed(format!("failed to update message: {e}"))
                        .with_remote_id(Some(remote_id));
                }
                remote_id
            }
            Ok(None) => match self
                .inner
                .client
                .create_message(&message, &thread_remote_id, &sender)
                .await
            {
                Ok(remote_id) => remote_id,
                Err(e) => {
                    return SyncOutcome::remote_failed(format!("failed to create message: {e}"))
                }
            },
            Err(e) => return SyncOutcome::store_failed(format!("failed to read mapping: {e}")),
        };

        if let Err(outcome) = self
            .record_mapping(EntityType::Message, message_id, &remote_id)
            .await
        {
            return outcome;
        }
        SyncOutcome::synced(remote_id, "message synced")
    }

    async fn remove_group(&self, group_id: i64) -> SyncOutcome {
        let remote_id = match self.mapped(EntityType::Group, group_id).await {
            Ok(Some(remote_id)) => remote_id,
            Ok(None) => {
                return SyncOutcome::skipped(format!("group {group_id} was never synced"))
            }
            Err(e) => return SyncOutcome::store_failed(format!("failed to read mapping: {e}")),
        };

        if let Err(e) = self.inner.client.delete_group(&remote_id).await {
            return SyncOutcome::remote_failed(format!("failed to delete group: {e}"))
                .with_remote_id(Some(remote_id));
        }

        match self
            .with_db(|db| db.remove_mapping(EntityType::Group, group_id))
            .await
        {
            Ok(_) => SyncOutcome::synced(remote_id, "group deleted"),
            Err(e) => SyncOutcome::store_failed(format!(
                "group deleted remotely but mapping removal failed: {e}"
            ))
            .with_remote_id(Some(remote_id)),
        }
    }

    async fn push_membership(
        &self,
        group_id: i64,
        user_id: i64,
        change: MembershipChange,
    ) -> SyncOutcome {
        let group_remote_id = match self.mapped(EntityType::Group, group_id).await {
            Ok(Some(remote_id)) => remote_id,
            Ok(None) => {
                return SyncOutcome::dependency_missing(format!("group {group_id} is not synced"))
            }
            Err(e) => return SyncOutcome::store_failed(format!("failed to read mapping: {e}")),
        };
        let user_remote_id = match self.platform().remote_user_id(user_id) {
            Ok(Some(remote_id)) => remote_id,
            Ok(None) => {
                return SyncOutcome::dependency_missing(format!(
                    "user {user_id} has no remote identity"
                ))
            }
            Err(e) => {
                return SyncOutcome::store_failed(format!("failed to look up user {user_id}: {e}"))
            }
        };
        let client = &self.inner.client;

        match change {
            MembershipChange::Remove => {
                match client.remove_group_member(&group_remote_id, &user_remote_id).await {
                    Ok(()) => SyncOutcome::synced(group_remote_id, "member removed"),
                    Err(e) => SyncOutcome::remote_failed(format!("failed to remove member: {e}")),
                }
            }
            MembershipChange::Add => {
                let member = match self.platform().group_member(group_id, user_id) {
                    Ok(Some(member)) => member,
                    Ok(None) => {
                        return SyncOutcome::not_found(format!(
                            "user {user_id} is not a member of group {group_id}"
                        ))
                    }
                    Err(e) => {
                        return SyncOutcome::store_failed(format!("failed to read membership: {e}"))
                    }
                };
                let pushed = match client
                    .update_group_member(&group_remote_id, &user_remote_id, member.role)
                    .await
                {
                    Ok(true) => Ok(()),
                    Ok(false) => {
                        client
                            .upsert_group_member(&group_remote_id, &user_remote_id, user_id, member.role)
                            .await
                    }
                    Err(e) => Err(e),
                };
                match pushed {
                    Ok(()) => SyncOutcome::synced(group_remote_id, "member synced"),
                    Err(e) => SyncOutcome::remote_failed(format!("failed to push member: {e}")),
                }
            }
        }
    }

    async fn mapped(&self, entity_type: EntityType, local_id: i64) -> Result<Option<String>> {
        Ok(self
            .with_db(|db| db.get_remote_id(entity_type, local_id))
            .await?)
    }

    /// Write or refresh a mapping after the remote confirmed.
    async fn record_mapping(
        &self,
        entity_type: EntityType,
        local_id: i64,
        remote_id: &str,
    ) -> std::result::Result<(), SyncOutcome> {
        self.with_db(|db| db.set_remote_id(entity_type, local_id, remote_id))
            .await
            .map_err(|e| {
                SyncOutcome::store_failed(format!(
                    "remote record {remote_id} written but mapping failed: {e}"
                ))
                .with_remote_id(Some(remote_id.to_string()))
            })
    }

    /// Audit, log and broadcast the top-level result of one attempt.
    async fn finish(&self, entity_type: EntityType, entity_id: i64, outcome: SyncOutcome) -> SyncOutcome {
        if outcome.kind.is_audited() {
            let record = if outcome.success() {
                AuditRecord::success(
                    entity_type,
                    entity_id,
                    outcome.remote_id.clone().unwrap_or_default(),
                )
            } else {
                AuditRecord::failure(entity_type, entity_id, outcome.message.clone())
                    .with_remote_id(outcome.remote_id.clone())
            };
            if let Err(e) = self.with_db(|db| db.append_audit(&record)).await {
                tracing::error!(
                    %entity_type,
                    entity_id,
                    error = %e,
                    "failed to write audit record"
                );
            }
        }

        match outcome.kind {
            OutcomeKind::Synced => tracing::info!(
                %entity_type,
                entity_id,
                remote_id = outcome.remote_id.as_deref().unwrap_or_default(),
                "{}",
                outcome.message
            ),
            OutcomeKind::Skipped | OutcomeKind::Disabled => tracing::debug!(
                %entity_type,
                entity_id,
                kind = %outcome.kind,
                "{}",
                outcome.message
            ),
            _ => tracing::warn!(
                %entity_type,
                entity_id,
                kind = %outcome.kind,
                "{}",
                outcome.message
            ),
        }

        // No listeners is fine
        let _ = self.inner.completed.send(SyncCompleted {
            entity_type,
            entity_id,
            outcome: outcome.clone(),
        });
        outcome
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
