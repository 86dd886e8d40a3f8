// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use rusqlite::{params, params_from_iter, Connection, OpenFlags, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::{Component, Group, GroupMember, LocalPlatform, Message, Thread};
use crate::error::Result;

/// Table layout [`SqlitePlatform`] reads from the host database.
///
/// A component counts as active when all of its tables exist.
pub const PLATFORM_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    display_name TEXT NOT NULL,
    remote_id TEXT
);

CREATE TABLE IF NOT EXISTS groups (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    privacy TEXT NOT NULL DEFAULT 'public',
    creator_id INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS group_members (
    group_id INTEGER NOT NULL,
    user_id INTEGER NOT NULL,
    role TEXT NOT NULL DEFAULT 'member',
    PRIMARY KEY (group_id, user_id)
);

CREATE TABLE IF NOT EXISTS threads (
    id INTEGER PRIMARY KEY,
    subject TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS thread_participants (
    thread_id INTEGER NOT NULL,
    user_id INTEGER NOT NULL,
    PRIMARY KEY (thread_id, user_id)
);

CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY,
    thread_id INTEGER NOT NULL,
    sender_id INTEGER NOT NULL,
    subject TEXT NOT NULL DEFAULT '',
    content TEXT NOT NULL,
    sent_at TEXT NOT NULL
);
"#;

const GROUP_TABLES: &[&str] = &["groups", "group_members"];
const MESSAGE_TABLES: &[&str] = &["threads", "thread_participants", "messages"];

/// Users looked up per identity query.
const USER_ID_CHUNK: usize = 500;

/// [`LocalPlatform`] over the community platform's SQLite database.
pub struct SqlitePlatform {
    conn: Mutex<Connection>,
}

impl SqlitePlatform {
    /// Open the host database read-only.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI,
        )?;
        conn.execute_batch("PRAGMA busy_timeout = 5000;")?;
        Ok(Self::from_connection(conn))
    }

    /// Wrap an existing connection.
    pub fn from_connection(conn: Connection) -> Self {
        SqlitePlatform {
            conn: Mutex::new(conn),
        }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn tables_exist(&self, tables: &[&str]) -> Result<bool> {
        let conn = self.conn();
        for table in tables {
            let exists: bool = conn.query_row(
                "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get(0),
            )?;
            if !exists {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn row_to_group(row: &rusqlite::Row<'_>) -> rusqlite::Result<Group> {
    let privacy: String = row.get(3)?;
    Ok(Group {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        privacy: parse_text(&privacy)?,
        creator_id: row.get(4)?,
    })
}

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        thread_id: row.get(1)?,
        sender_id: row.get(2)?,
        subject: row.get(3)?,
        content: row.get(4)?,
    })
}

fn parse_text<T>(value: &str) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = crate::error::Error>,
{
    value.parse().map_err(|e: crate::error::Error| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

impl LocalPlatform for SqlitePlatform {
    fn is_active(&self, component: Component) -> bool {
        let tables = match component {
            Component::Groups => GROUP_TABLES,
            Component::Messages => MESSAGE_TABLES,
        };
        match self.tables_exist(tables) {
            Ok(active) => active,
            Err(e) => {
                tracing::warn!(component = component.as_str(), error = %e, "component check failed");
                false
            }
        }
    }

    fn list_groups(&self, limit: usize, offset: usize) -> Result<Vec<Group>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, name, description, privacy, creator_id FROM groups
             ORDER BY id LIMIT ?1 OFFSET ?2",
        )?;
        let groups = stmt
            .query_map(params![to_i64(limit), to_i64(offset)], row_to_group)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(groups)
    }

    fn get_group(&self, group_id: i64) -> Result<Option<Group>> {
        let group = self
            .conn()
            .query_row(
                "SELECT id, name, description, privacy, creator_id FROM groups WHERE id = ?1",
                params![group_id],
                row_to_group,
            )
            .optional()?;
        Ok(group)
    }

    fn group_members(&self, group_id: i64) -> Result<Vec<GroupMember>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT user_id, role FROM group_members WHERE group_id = ?1 ORDER BY user_id",
        )?;
        let members = stmt
            .query_map(params![group_id], |row| {
                let role: String = row.get(1)?;
                Ok(GroupMember {
                    user_id: row.get(0)?,
                    role: parse_text(&role)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(members)
    }

    fn group_member(&self, group_id: i64, user_id: i64) -> Result<Option<GroupMember>> {
        let member = self
            .conn()
            .query_row(
                "SELECT user_id, role FROM group_members WHERE group_id = ?1 AND user_id = ?2",
                params![group_id, user_id],
                |row| {
                    let role: String = row.get(1)?;
                    Ok(GroupMember {
                        user_id: row.get(0)?,
                        role: parse_text(&role)?,
                    })
                },
            )
            .optional()?;
        Ok(member)
    }

    fn get_thread(&self, thread_id: i64) -> Result<Option<Thread>> {
        let conn = self.conn();
        let subject: Option<String> = conn
            .query_row(
                "SELECT subject FROM threads WHERE id = ?1",
                params![thread_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(subject) = subject else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT user_id FROM thread_participants WHERE thread_id = ?1 ORDER BY user_id",
        )?;
        let participants = stmt
            .query_map(params![thread_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<i64>, _>>()?;

        Ok(Some(Thread {
            id: thread_id,
            subject,
            participants,
        }))
    }

    fn get_message(&self, message_id: i64) -> Result<Option<Message>> {
        let message = self
            .conn()
            .query_row(
                "SELECT id, thread_id, sender_id, subject, content FROM messages WHERE id = ?1",
                params![message_id],
                row_to_message,
            )
            .optional()?;
        Ok(message)
    }

    fn recent_messages(&self, limit: usize, offset: usize) -> Result<Vec<Message>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, thread_id, sender_id, subject, content FROM messages
             ORDER BY sent_at DESC, id DESC LIMIT ?1 OFFSET ?2",
        )?;
        let messages = stmt
            .query_map(params![to_i64(limit), to_i64(offset)], row_to_message)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(messages)
    }

    fn remote_user_id(&self, user_id: i64) -> Result<Option<String>> {
        let remote: Option<Option<String>> = self
            .conn()
            .query_row(
                "SELECT remote_id FROM users WHERE id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(remote.flatten().filter(|id| !id.is_empty()))
    }

    fn remote_user_ids(&self, user_ids: &[i64]) -> Result<HashMap<i64, String>> {
        let conn = self.conn();
        let mut pairs = HashMap::with_capacity(user_ids.len());
        // Bounded below SQLite's host parameter limit.
        for chunk in user_ids.chunks(USER_ID_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!(
                "SELECT id, remote_id FROM users
                 WHERE id IN ({placeholders}) AND remote_id IS NOT NULL AND remote_id != ''"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?;
            for row in rows {
                let (id, remote_id) = row?;
                pairs.insert(id, remote_id);
            }
        }
        Ok(pairs)
    }

    fn sample_user(&self) -> Result<Option<i64>> {
        let user = self
            .conn()
            .query_row("SELECT id FROM users ORDER BY id LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(user)
    }
}

#[cfg(test)]
#[path = "sqlite_tests.rs"]
mod tests;
