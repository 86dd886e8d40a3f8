// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Typed client for the remote REST backend.
//!
//! Every write goes through here. Creates answer with the stored row so the
//! caller can learn the new remote id; sub-item pushes are upserts so replays
//! are harmless.

use chrono::Utc;
use serde_json::{json, Value};

use gs_core::EntityType;

use super::transport::{
    HttpTransport, Method, RemoteError, RemoteRequest, RemoteResult, Transport,
};
use crate::config::RemoteConfig;
use crate::platform::{Group, MemberRole, Message, Thread};

const RETURN_REPRESENTATION: &str = "return=representation";
const MERGE_DUPLICATES: &str = "resolution=merge-duplicates,return=representation";

/// Remote collections written by the sync engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Groups,
    GroupMembers,
    MessageThreads,
    ThreadParticipants,
    Messages,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Groups => "groups",
            Resource::GroupMembers => "group_members",
            Resource::MessageThreads => "message_threads",
            Resource::ThreadParticipants => "thread_participants",
            Resource::Messages => "messages",
        }
    }

    /// Collection holding top-level records of an entity type.
    pub fn for_entity(entity_type: EntityType) -> Self {
        match entity_type {
            EntityType::Group => Resource::Groups,
            EntityType::Thread => Resource::MessageThreads,
            EntityType::Message => Resource::Messages,
        }
    }
}

/// Typed REST client over a [`Transport`].
pub struct RemoteClient<T: Transport = HttpTransport> {
    transport: T,
    platform_source: String,
}

impl RemoteClient<HttpTransport> {
    /// Build a client with the real HTTP transport.
    pub fn from_config(config: &RemoteConfig) -> RemoteResult<Self> {
        Ok(Self::new(
            HttpTransport::new(config)?,
            config.platform_source.clone(),
        ))
    }
}

impl<T: Transport> RemoteClient<T> {
    pub fn new(transport: T, platform_source: impl Into<String>) -> Self {
        RemoteClient {
            transport,
            platform_source: platform_source.into(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send a request and decode the returned rows.
    async fn send(&self, request: RemoteRequest) -> RemoteResult<Vec<Value>> {
        let method = request.method;
        let resource = request.resource.clone();
        let response = self.transport.execute(request).await?;
        if !response.is_success() {
            tracing::warn!(
                %method,
                %resource,
                status = response.status,
                body = %response.body,
                "remote returned error status"
            );
            return Err(RemoteError::Status {
                status: response.status,
                body: response.body,
            });
        }
        decode_rows(&response.body)
    }

    /// Cheapest authenticated read, used by the self-test.
    pub async fn ping(&self) -> RemoteResult<()> {
        self.send(RemoteRequest::new(Method::Get, Resource::Groups.as_str()).with_query("limit", "1"))
            .await
            .map(|_| ())
    }

    /// Fetch one record by remote id.
    pub async fn get_by_id(&self, resource: Resource, remote_id: &str) -> RemoteResult<Option<Value>> {
        let rows = self
            .send(
                RemoteRequest::new(Method::Get, resource.as_str())
                    .with_query("id", format!("eq.{remote_id}")),
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Fetch records by the local ids they were created from.
    pub async fn find_by_local_ids(&self, resource: Resource, local_ids: &[i64]) -> RemoteResult<Vec<Value>> {
        if local_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = local_ids
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.send(
            RemoteRequest::new(Method::Get, resource.as_str())
                .with_query("local_id", format!("in.({ids})")),
        )
        .await
    }

    async fn create(&self, resource: Resource, body: Value) -> RemoteResult<String> {
        let rows = self
            .send(
                RemoteRequest::new(Method::Post, resource.as_str())
                    .with_body(body)
                    .with_prefer(RETURN_REPRESENTATION),
            )
            .await?;
        first_id(&rows)
    }

    async fn update(&self, resource: Resource, remote_id: &str, body: Value) -> RemoteResult<()> {
        self.send(
            RemoteRequest::new(Method::Patch, resource.as_str())
                .with_query("id", format!("eq.{remote_id}"))
                .with_body(body),
        )
        .await
        .map(|_| ())
    }

    async fn upsert(&self, resource: Resource, on_conflict: &str, body: Value) -> RemoteResult<()> {
        self.send(
            RemoteRequest::new(Method::Post, resource.as_str())
                .with_query("on_conflict", on_conflict)
                .with_body(body)
                .with_prefer(MERGE_DUPLICATES),
        )
        .await
        .map(|_| ())
    }

    pub async fn create_group(&self, group: &Group, creator_remote_id: &str) -> RemoteResult<String> {
        self.create(
            Resource::Groups,
            json!({
                "local_id": group.id,
                "name": group.name,
                "description": group.description,
                "privacy": group.privacy.as_str(),
                "creator_id": creator_remote_id,
                "platform_source": self.platform_source,
            }),
        )
        .await
    }

    pub async fn update_group(&self, remote_id: &str, group: &Group) -> RemoteResult<()> {
        self.update(
            Resource::Groups,
            remote_id,
            json!({
                "name": group.name,
                "description": group.description,
                "privacy": group.privacy.as_str(),
                "updated_at": Utc::now().to_rfc3339(),
                "platform_source": self.platform_source,
            }),
        )
        .await
    }

    pub async fn delete_group(&self, remote_id: &str) -> RemoteResult<()> {
        self.send(
            RemoteRequest::new(Method::Delete, Resource::Groups.as_str())
                .with_query("id", format!("eq.{remote_id}")),
        )
        .await
        .map(|_| ())
    }

    /// Create or refresh one group membership.
    pub async fn upsert_group_member(
        &self,
        group_remote_id: &str,
        user_remote_id: &str,
        local_user_id: i64,
        role: MemberRole,
    ) -> RemoteResult<()> {
        self.upsert(
            Resource::GroupMembers,
            "group_id,user_id",
            json!({
                "group_id": group_remote_id,
                "user_id": user_remote_id,
                "local_user_id": local_user_id,
                "role": role.as_str(),
                "platform_source": self.platform_source,
            }),
        )
        .await
    }

    /// Change a member's role. Returns whether a remote row matched.
    pub async fn update_group_member(
        &self,
        group_remote_id: &str,
        user_remote_id: &str,
        role: MemberRole,
    ) -> RemoteResult<bool> {
        let rows = self
            .send(
                RemoteRequest::new(Method::Patch, Resource::GroupMembers.as_str())
                    .with_query("group_id", format!("eq.{group_remote_id}"))
                    .with_query("user_id", format!("eq.{user_remote_id}"))
                    .with_body(json!({
                        "role": role.as_str(),
                        "platform_source": self.platform_source,
                    }))
                    .with_prefer(RETURN_REPRESENTATION),
            )
            .await?;
        Ok(!rows.is_empty())
    }

    pub async fn remove_group_member(&self, group_remote_id: &str, user_remote_id: &str) -> RemoteResult<()> {
        self.send(
            RemoteRequest::new(Method::Delete, Resource::GroupMembers.as_str())
                .with_query("group_id", format!("eq.{group_remote_id}"))
                .with_query("user_id", format!("eq.{user_remote_id}")),
        )
        .await
        .map(|_| ())
    }

    pub async fn create_thread(&self, thread: &Thread) -> RemoteResult<String> {
        self.create(
            Resource::MessageThreads,
            json!({
                "local_id": thread.id,
                "subject": thread.subject,
                "platform_source": self.platform_source,
            }),
        )
        .await
    }

    pub async fn update_thread(&self, remote_id: &str, thread: &Thread) -> RemoteResult<()> {
        self.update(
            Resource::MessageThreads,
            remote_id,
            json!({
                "subject": thread.subject,
                "updated_at": Utc::now().to_rfc3339(),
                "platform_source": self.platform_source,
            }),
        )
        .await
    }

    pub async fn upsert_thread_participant(
        &self,
        thread_remote_id: &str,
        user_remote_id: &str,
        local_user_id: i64,
    ) -> RemoteResult<()> {
        self.upsert(
            Resource::ThreadParticipants,
            "thread_id,user_id",
            json!({
                "thread_id": thread_remote_id,
                "user_id": user_remote_id,
                "local_user_id": local_user_id,
            }),
        )
        .await
    }

    pub async fn create_message(
        &self,
        message: &Message,
        thread_remote_id: &str,
        sender_remote_id: &str,
    ) -> RemoteResult<String> {
        self.create(
            Resource::Messages,
            json!({
                "local_id": message.id,
                "thread_id": thread_remote_id,
                "sender_id": sender_remote_id,
                "local_sender_id": message.sender_id,
                "content": message.content,
                "message_type": "text",
                "platform_source": self.platform_source,
            }),
        )
        .await
    }

    pub async fn update_message(&self, remote_id: &str, message: &Message) -> RemoteResult<()> {
        self.update(
            Resource::Messages,
            remote_id,
            json!({
                "content": message.content,
                "updated_at": Utc::now().to_rfc3339(),
                "platform_source": self.platform_source,
            }),
        )
        .await
    }
}

/// Decode a response body into rows. An empty body (204) is no rows.
fn decode_rows(body: &str) -> RemoteResult<Vec<Value>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(rows)) => Ok(rows),
        Ok(row @ Value::Object(_)) => Ok(vec![row]),
        Ok(other) => Err(RemoteError::Decode(format!("expected rows, got {other}"))),
        Err(e) => Err(RemoteError::Decode(e.to_string())),
    }
}

/// The `id` of the first returned row, as text.
fn first_id(rows: &[Value]) -> RemoteResult<String> {
    match rows.first().and_then(|row| row.get("id")) {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        Some(Value::Number(id)) => Ok(id.to_string()),
        _ => Err(RemoteError::Decode(
            "create response carried no id".to_string(),
        )),
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
