// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only boundary to the local community platform.
//!
//! The sync engine never writes to the platform. Everything it needs to read
//! goes through [`LocalPlatform`], which keeps the engine testable against an
//! in-memory platform and lets [`SqlitePlatform`] serve the real host database.

mod sqlite;

pub use sqlite::{SqlitePlatform, PLATFORM_SCHEMA};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Group visibility on the local platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Privacy {
    Public,
    Private,
    Hidden,
}

impl Privacy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Privacy::Public => "public",
            Privacy::Private => "private",
            Privacy::Hidden => "hidden",
        }
    }
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Privacy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "public" => Ok(Privacy::Public),
            "private" => Ok(Privacy::Private),
            "hidden" => Ok(Privacy::Hidden),
            _ => Err(Error::Config(format!("unknown group privacy '{s}'"))),
        }
    }
}

/// A member's role inside a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Admin,
    Mod,
    Member,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Admin => "admin",
            MemberRole::Mod => "mod",
            MemberRole::Member => "member",
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MemberRole {
    type Err = Error;

    /// Unknown roles read as plain membership.
    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "admin" => MemberRole::Admin,
            "mod" | "moderator" => MemberRole::Mod,
            _ => MemberRole::Member,
        })
    }
}

/// Optional platform feature sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Groups,
    Messages,
}

impl Component {
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Groups => "groups",
            Component::Messages => "messages",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub privacy: Privacy,
    pub creator_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GroupMember {
    pub user_id: i64,
    pub role: MemberRole,
}

/// A private message thread with its participant user ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thread {
    pub id: i64,
    pub subject: String,
    pub participants: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: i64,
    pub thread_id: i64,
    pub sender_id: i64,
    pub subject: String,
    pub content: String,
}

/// Read access to the local platform.
///
/// Implementations must be cheap to call from async tasks; every method is
/// a short synchronous read.
pub trait LocalPlatform: Send + Sync {
    /// Whether a feature set is installed and enabled.
    fn is_active(&self, component: Component) -> bool;

    /// Groups in id order.
    fn list_groups(&self, limit: usize, offset: usize) -> Result<Vec<Group>>;

    fn get_group(&self, group_id: i64) -> Result<Option<Group>>;

    fn group_members(&self, group_id: i64) -> Result<Vec<GroupMember>>;

    /// A single membership, if the user belongs to the group.
    fn group_member(&self, group_id: i64, user_id: i64) -> Result<Option<GroupMember>>;

    fn get_thread(&self, thread_id: i64) -> Result<Option<Thread>>;

    fn get_message(&self, message_id: i64) -> Result<Option<Message>>;

    /// Messages, newest first.
    fn recent_messages(&self, limit: usize, offset: usize) -> Result<Vec<Message>>;

    /// The remote identity of a local user, if one was provisioned.
    fn remote_user_id(&self, user_id: i64) -> Result<Option<String>>;

    /// Batched identity lookup. Users without an identity are absent from the map.
    fn remote_user_ids(&self, user_ids: &[i64]) -> Result<HashMap<i64, String>>;

    /// Any one local user, for the connectivity self-test.
    fn sample_user(&self) -> Result<Option<i64>>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
