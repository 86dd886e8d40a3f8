// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test doubles: an in-memory REST backend and an in-memory platform.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use crate::config::{Config, PrivacyTier};
use crate::error::Result;
use crate::platform::{
    Component, Group, GroupMember, LocalPlatform, MemberRole, Message, Privacy, Thread,
};
use crate::remote::{Method, RemoteError, RemoteRequest, RemoteResponse, RemoteResult, Transport};

// ---------------------------------------------------------------------------
// Mock backend
// ---------------------------------------------------------------------------

struct Failure {
    resource: String,
    method: Method,
    status: u16,
    /// `None` fails forever.
    remaining: Option<usize>,
}

#[derive(Default)]
struct Backend {
    tables: HashMap<String, Vec<Value>>,
    next_id: HashMap<String, u64>,
    requests: Vec<RemoteRequest>,
    failures: Vec<Failure>,
    offline: bool,
}

fn id_prefix(resource: &str) -> &'static str {
    match resource {
        "groups" => "g",
        "group_members" => "gm",
        "message_threads" => "t",
        "thread_participants" => "tp",
        "messages" => "m",
        _ => "x",
    }
}

fn upsert_key(resource: &str) -> &'static [&'static str] {
    match resource {
        "group_members" => &["group_id", "user_id"],
        "thread_participants" => &["thread_id", "user_id"],
        _ => &["id"],
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// PostgREST-style filter check for `eq.` and `in.(..)` operators.
fn row_matches(row: &Value, query: &[(String, String)]) -> bool {
    query.iter().all(|(key, filter)| {
        if key == "limit" || key == "on_conflict" || key == "select" {
            return true;
        }
        let actual = row.get(key).map(as_text).unwrap_or_default();
        if let Some(expected) = filter.strip_prefix("eq.") {
            actual == expected
        } else if let Some(list) = filter
            .strip_prefix("in.(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            list.split(',').any(|item| item == actual)
        } else {
            false
        }
    })
}

impl Backend {
    fn handle(&mut self, request: &RemoteRequest) -> RemoteResponse {
        let resource = request.resource.clone();
        match request.method {
            Method::Get => {
                let limit = request
                    .query_value("limit")
                    .and_then(|l| l.parse::<usize>().ok())
                    .unwrap_or(usize::MAX);
                let rows: Vec<Value> = self
                    .tables
                    .get(&resource)
                    .map(|rows| {
                        rows.iter()
                            .filter(|row| row_matches(row, &request.query))
                            .take(limit)
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default();
                RemoteResponse::new(200, Value::Array(rows).to_string())
            }
            Method::Post => {
                let mut body = request.body.clone().unwrap_or_else(|| json!({}));
                let merge = request
                    .prefer
                    .as_deref()
                    .is_some_and(|p| p.contains("merge-duplicates"));
                let table = self.tables.entry(resource.clone()).or_default();

                if merge {
                    let key = upsert_key(&resource);
                    if let Some(existing) = table
                        .iter_mut()
                        .find(|row| key.iter().all(|k| row.get(*k) == body.get(*k)))
                    {
                        if let (Some(target), Some(fields)) =
                            (existing.as_object_mut(), body.as_object())
                        {
                            for (k, v) in fields {
                                target.insert(k.clone(), v.clone());
                            }
                        }
                        return RemoteResponse::new(201, json!([existing.clone()]).to_string());
                    }
                }

                let counter = self.next_id.entry(resource.clone()).or_insert(0);
                *counter += 1;
                let id = format!("{}-{}", id_prefix(&resource), counter);
                if let Some(obj) = body.as_object_mut() {
                    obj.insert("id".to_string(), Value::String(id));
                }
                table.push(body.clone());
                RemoteResponse::new(201, json!([body]).to_string())
            }
            Method::Patch => {
                let fields = request
                    .body
                    .as_ref()
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_default();
                let mut updated = Vec::new();
                if let Some(rows) = self.tables.get_mut(&resource) {
                    for row in rows.iter_mut().filter(|row| row_matches(row, &request.query)) {
                        if let Some(target) = row.as_object_mut() {
                            for (k, v) in &fields {
                                target.insert(k.clone(), v.clone());
                            }
                        }
                        updated.push(row.clone());
                    }
                }
                if request.prefer.is_some() {
                    RemoteResponse::new(200, Value::Array(updated).to_string())
                } else {
                    RemoteResponse::new(204, "")
                }
            }
            Method::Delete => {
                if let Some(rows) = self.tables.get_mut(&resource) {
                    rows.retain(|row| !row_matches(row, &request.query));
                }
                RemoteResponse::new(204, "")
            }
        }
    }
}

/// In-memory stand-in for the remote REST backend.
///
/// Clones share state, so a test can keep a handle after giving one to the
/// engine.
#[derive(Clone, Default)]
pub struct MockTransport {
    backend: Arc<Mutex<Backend>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows currently stored in a collection.
    pub fn rows(&self, resource: &str) -> Vec<Value> {
        self.backend
            .lock()
            .unwrap()
            .tables
            .get(resource)
            .cloned()
            .unwrap_or_default()
    }

    /// Seed a row directly.
    pub fn insert_row(&self, resource: &str, row: Value) {
        self.backend
            .lock()
            .unwrap()
            .tables
            .entry(resource.to_string())
            .or_default()
            .push(row);
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<RemoteRequest> {
        self.backend.lock().unwrap().requests.clone()
    }

    /// Requests for one collection and method.
    pub fn requests_for(&self, resource: &str, method: Method) -> Vec<RemoteRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.resource == resource && r.method == method)
            .collect()
    }

    /// Answer every matching request with `status`.
    pub fn fail(&self, resource: &str, method: Method, status: u16) {
        self.push_failure(resource, method, status, None);
    }

    /// Answer the next `times` matching requests with `status`.
    pub fn fail_times(&self, resource: &str, method: Method, status: u16, times: usize) {
        self.push_failure(resource, method, status, Some(times));
    }

    fn push_failure(&self, resource: &str, method: Method, status: u16, remaining: Option<usize>) {
        self.backend.lock().unwrap().failures.push(Failure {
            resource: resource.to_string(),
            method,
            status,
            remaining,
        });
    }

    /// Make every request fail at the transport level.
    pub fn set_offline(&self, offline: bool) {
        self.backend.lock().unwrap().offline = offline;
    }
}

impl Transport for MockTransport {
    fn execute(
        &self,
        request: RemoteRequest,
    ) -> Pin<Box<dyn Future<Output = RemoteResult<RemoteResponse>> + Send + '_>> {
        let backend = Arc::clone(&self.backend);
        Box::pin(async move {
            let mut backend = backend.lock().unwrap();
            backend.requests.push(request.clone());

            if backend.offline {
                return Err(RemoteError::Transport("connection refused".into()));
            }

            let injected = backend.failures.iter_mut().find(|f| {
                f.resource == request.resource
                    && f.method == request.method
                    && f.remaining.map_or(true, |n| n > 0)
            });
            if let Some(failure) = injected {
                if let Some(n) = failure.remaining.as_mut() {
                    *n -= 1;
                }
                let status = failure.status;
                return Ok(RemoteResponse::new(
                    status,
                    json!({ "message": "injected failure" }).to_string(),
                ));
            }

            Ok(backend.handle(&request))
        })
    }
}

// ---------------------------------------------------------------------------
// In-memory platform
// ---------------------------------------------------------------------------

#[derive(Default)]
struct PlatformState {
    groups: BTreeMap<i64, Group>,
    members: BTreeMap<i64, Vec<GroupMember>>,
    threads: BTreeMap<i64, Thread>,
    messages: BTreeMap<i64, Message>,
    identities: HashMap<i64, String>,
    users: Vec<i64>,
    inactive: HashSet<&'static str>,
    fail_reads: bool,
}

/// [`LocalPlatform`] backed by plain collections, editable mid-test.
#[derive(Clone, Default)]
pub struct MemoryPlatform {
    state: Arc<Mutex<PlatformState>>,
}

impl MemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user_id: i64, remote_id: Option<&str>) {
        let mut state = self.state.lock().unwrap();
        if !state.users.contains(&user_id) {
            state.users.push(user_id);
            state.users.sort_unstable();
        }
        match remote_id {
            Some(id) => {
                state.identities.insert(user_id, id.to_string());
            }
            None => {
                state.identities.remove(&user_id);
            }
        }
    }

    pub fn add_group(&self, id: i64, name: &str, privacy: Privacy, creator_id: i64) {
        self.state.lock().unwrap().groups.insert(
            id,
            Group {
                id,
                name: name.to_string(),
                description: String::new(),
                privacy,
                creator_id,
            },
        );
    }

    pub fn rename_group(&self, id: i64, name: &str) {
        if let Some(group) = self.state.lock().unwrap().groups.get_mut(&id) {
            group.name = name.to_string();
        }
    }

    pub fn remove_group(&self, id: i64) {
        let mut state = self.state.lock().unwrap();
        state.groups.remove(&id);
        state.members.remove(&id);
    }

    pub fn add_member(&self, group_id: i64, user_id: i64, role: MemberRole) {
        let mut state = self.state.lock().unwrap();
        let members = state.members.entry(group_id).or_default();
        members.retain(|m| m.user_id != user_id);
        members.push(GroupMember { user_id, role });
    }

    pub fn remove_member(&self, group_id: i64, user_id: i64) {
        if let Some(members) = self.state.lock().unwrap().members.get_mut(&group_id) {
            members.retain(|m| m.user_id != user_id);
        }
    }

    pub fn add_thread(&self, id: i64, subject: &str, participants: &[i64]) {
        self.state.lock().unwrap().threads.insert(
            id,
            Thread {
                id,
                subject: subject.to_string(),
                participants: participants.to_vec(),
            },
        );
    }

    pub fn add_message(&self, id: i64, thread_id: i64, sender_id: i64, content: &str) {
        self.state.lock().unwrap().messages.insert(
            id,
            Message {
                id,
                thread_id,
                sender_id,
                subject: String::new(),
                content: content.to_string(),
            },
        );
    }

    pub fn set_active(&self, component: Component, active: bool) {
        let mut state = self.state.lock().unwrap();
        if active {
            state.inactive.remove(component.as_str());
        } else {
            state.inactive.insert(component.as_str());
        }
    }

    /// Make every read fail with a database error.
    pub fn set_fail_reads(&self, fail: bool) {
        self.state.lock().unwrap().fail_reads = fail;
    }

    fn check(&self) -> Result<()> {
        if self.state.lock().unwrap().fail_reads {
            return Err(rusqlite::Error::InvalidQuery.into());
        }
        Ok(())
    }
}

impl LocalPlatform for MemoryPlatform {
    fn is_active(&self, component: Component) -> bool {
        !self
            .state
            .lock()
            .unwrap()
            .inactive
            .contains(component.as_str())
    }

    fn list_groups(&self, limit: usize, offset: usize) -> Result<Vec<Group>> {
        self.check()?;
        let state = self.state.lock().unwrap();
        Ok(state.groups.values().skip(offset).take(limit).cloned().collect())
    }

    fn get_group(&self, group_id: i64) -> Result<Option<Group>> {
        self.check()?;
        Ok(self.state.lock().unwrap().groups.get(&group_id).cloned())
    }

    fn group_members(&self, group_id: i64) -> Result<Vec<GroupMember>> {
        self.check()?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .members
            .get(&group_id)
            .cloned()
            .unwrap_or_default())
    }

    fn group_member(&self, group_id: i64, user_id: i64) -> Result<Option<GroupMember>> {
        Ok(self
            .group_members(group_id)?
            .into_iter()
            .find(|m| m.user_id == user_id))
    }

    fn get_thread(&self, thread_id: i64) -> Result<Option<Thread>> {
        self.check()?;
        Ok(self.state.lock().unwrap().threads.get(&thread_id).cloned())
    }

    fn get_message(&self, message_id: i64) -> Result<Option<Message>> {
        self.check()?;
        Ok(self.state.lock().unwrap().messages.get(&message_id).cloned())
    }

    fn recent_messages(&self, limit: usize, offset: usize) -> Result<Vec<Message>> {
        self.check()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .messages
            .values()
            .rev()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn remote_user_id(&self, user_id: i64) -> Result<Option<String>> {
        self.check()?;
        Ok(self.state.lock().unwrap().identities.get(&user_id).cloned())
    }

    fn remote_user_ids(&self, user_ids: &[i64]) -> Result<HashMap<i64, String>> {
        self.check()?;
        let state = self.state.lock().unwrap();
        Ok(user_ids
            .iter()
            .filter_map(|id| state.identities.get(id).map(|r| (*id, r.clone())))
            .collect())
    }

    fn sample_user(&self) -> Result<Option<i64>> {
        self.check()?;
        Ok(self.state.lock().unwrap().users.first().copied())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A configuration with every kind enabled and a fake remote.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.remote.url = "https://backend.test".to_string();
    config.remote.service_key = "service-key".to_string();
    config.sync.groups = true;
    config.sync.messages = true;
    config.sync.group_privacy = PrivacyTier::PublicOnly;
    config
}
