// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Identity mapping between local entity ids and remote record ids.
//!
//! A mapping row exists only after the remote backend confirmed a create.
//! Both `(entity_type, local_id)` and `(entity_type, remote_id)` are unique.

use chrono::{DateTime, Utc};
use rusqlite::{params, ErrorCode, OptionalExtension};
use serde::Serialize;

use crate::db::{format_timestamp, parse_db, parse_timestamp, Database};
use crate::entity::EntityType;
use crate::error::{Error, Result};

/// A stored local-to-remote identity pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mapping {
    pub entity_type: EntityType,
    pub local_id: i64,
    pub remote_id: String,
    /// When the remote create was first confirmed.
    pub created_at: DateTime<Utc>,
    /// When the entity was last pushed successfully.
    pub updated_at: DateTime<Utc>,
}

impl Database {
    /// Look up the remote id for a local entity.
    pub fn get_remote_id(&self, entity_type: EntityType, local_id: i64) -> Result<Option<String>> {
        let remote_id = self
            .conn
            .query_row(
                "SELECT remote_id FROM sync_mappings WHERE entity_type = ?1 AND local_id = ?2",
                params![entity_type.as_str(), local_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(remote_id)
    }

    /// Record (or refresh) the remote id for a local entity.
    ///
    /// Upserts on `(entity_type, local_id)`, so calling this twice leaves one
    /// row carrying the latest remote id and a refreshed `updated_at`.
    /// Fails with [`Error::MappingConflict`] when the remote id already
    /// belongs to a different local entity of the same type.
    pub fn set_remote_id(
        &self,
        entity_type: EntityType,
        local_id: i64,
        remote_id: &str,
    ) -> Result<()> {
        let now = format_timestamp(&Utc::now());
        let result = self.conn.execute(
            "INSERT INTO sync_mappings (entity_type, local_id, remote_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(entity_type, local_id)
             DO UPDATE SET remote_id = excluded.remote_id, updated_at = excluded.updated_at",
            params![entity_type.as_str(), local_id, remote_id, now],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(Error::MappingConflict {
                    entity_type: entity_type.to_string(),
                    remote_id: remote_id.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Reverse lookup: which local entity owns this remote id.
    pub fn get_local_id(&self, entity_type: EntityType, remote_id: &str) -> Result<Option<i64>> {
        let local_id = self
            .conn
            .query_row(
                "SELECT local_id FROM sync_mappings WHERE entity_type = ?1 AND remote_id = ?2",
                params![entity_type.as_str(), remote_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(local_id)
    }

    /// Remove a mapping. Returns whether a row existed.
    pub fn remove_mapping(&self, entity_type: EntityType, local_id: i64) -> Result<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM sync_mappings WHERE entity_type = ?1 AND local_id = ?2",
            params![entity_type.as_str(), local_id],
        )?;
        Ok(deleted > 0)
    }

    /// Get the full mapping row for a local entity.
    pub fn get_mapping(&self, entity_type: EntityType, local_id: i64) -> Result<Option<Mapping>> {
        let mapping = self
            .conn
            .query_row(
                "SELECT entity_type, local_id, remote_id, created_at, updated_at
                 FROM sync_mappings WHERE entity_type = ?1 AND local_id = ?2",
                params![entity_type.as_str(), local_id],
                |row| {
                    let type_str: String = row.get(0)?;
                    let created_str: String = row.get(3)?;
                    let updated_str: String = row.get(4)?;
                    Ok(Mapping {
                        entity_type: parse_db(&type_str, "entity_type")?,
                        local_id: row.get(1)?,
                        remote_id: row.get(2)?,
                        created_at: parse_timestamp(&created_str, "created_at")?,
                        updated_at: parse_timestamp(&updated_str, "updated_at")?,
                    })
                },
            )
            .optional()?;
        Ok(mapping)
    }

    /// Count mappings of one entity type.
    pub fn count_mappings(&self, entity_type: EntityType) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sync_mappings WHERE entity_type = ?1",
            params![entity_type.as_str()],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

#[cfg(test)]
#[path = "mapping_tests.rs"]
mod tests;
