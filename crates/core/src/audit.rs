// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only sync audit log.

use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::{Deserialize, Serialize};

use crate::db::{format_timestamp, parse_db, parse_timestamp, Database};
use crate::entity::{EntityType, SyncDirection, SyncStatus};
use crate::error::Result;

/// One recorded sync attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Database-assigned identifier.
    pub id: i64,
    pub entity_type: EntityType,
    /// Local id of the entity that was pushed.
    pub entity_id: i64,
    /// Remote id, when one was known at the time of the attempt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    pub direction: SyncDirection,
    pub status: SyncStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub synced_at: DateTime<Utc>,
}

impl AuditRecord {
    /// Creates a push record stamped with the current time.
    pub fn new(entity_type: EntityType, entity_id: i64, status: SyncStatus) -> Self {
        AuditRecord {
            id: 0, // Will be set by database
            entity_type,
            entity_id,
            remote_id: None,
            direction: SyncDirection::Push,
            status,
            error_message: None,
            synced_at: Utc::now(),
        }
    }

    /// A successful push.
    pub fn success(entity_type: EntityType, entity_id: i64, remote_id: impl Into<String>) -> Self {
        Self::new(entity_type, entity_id, SyncStatus::Success).with_remote_id(Some(remote_id.into()))
    }

    /// A failed push with its error message.
    pub fn failure(entity_type: EntityType, entity_id: i64, message: impl Into<String>) -> Self {
        let mut record = Self::new(entity_type, entity_id, SyncStatus::Error);
        record.error_message = Some(message.into());
        record
    }

    /// Sets the remote id (builder pattern).
    pub fn with_remote_id(mut self, remote_id: Option<String>) -> Self {
        self.remote_id = remote_id;
        self
    }

    /// Sets a specific timestamp for this record.
    pub fn with_timestamp(mut self, synced_at: DateTime<Utc>) -> Self {
        self.synced_at = synced_at;
        self
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, entity_type, entity_id, remote_id, direction, status, error_message, synced_at
     FROM sync_log";

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<AuditRecord> {
    let type_str: String = row.get(1)?;
    let direction_str: String = row.get(4)?;
    let status_str: String = row.get(5)?;
    let synced_str: String = row.get(7)?;
    Ok(AuditRecord {
        id: row.get(0)?,
        entity_type: parse_db(&type_str, "entity_type")?,
        entity_id: row.get(2)?,
        remote_id: row.get(3)?,
        direction: parse_db(&direction_str, "direction")?,
        status: parse_db(&status_str, "status")?,
        error_message: row.get(6)?,
        synced_at: parse_timestamp(&synced_str, "synced_at")?,
    })
}

impl Database {
    /// Append an audit record and return its id.
    pub fn append_audit(&self, record: &AuditRecord) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO sync_log (entity_type, entity_id, remote_id, direction, status, error_message, synced_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.entity_type.as_str(),
                record.entity_id,
                record.remote_id,
                record.direction.as_str(),
                record.status.as_str(),
                record.error_message,
                format_timestamp(&record.synced_at),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent records first, optionally filtered to one entity type.
    pub fn query_audit(
        &self,
        limit: usize,
        offset: usize,
        entity_type: Option<EntityType>,
    ) -> Result<Vec<AuditRecord>> {
        let sql = format!(
            "{SELECT_COLUMNS}
             WHERE (?1 IS NULL OR entity_type = ?1)
             ORDER BY synced_at DESC, id DESC
             LIMIT ?2 OFFSET ?3"
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let offset_i64 = i64::try_from(offset).unwrap_or(i64::MAX);
        let records = stmt
            .query_map(
                params![entity_type.map(|t| t.as_str()), limit_i64, offset_i64],
                row_to_record,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// All records for one entity, oldest first.
    pub fn audit_for_entity(
        &self,
        entity_type: EntityType,
        entity_id: i64,
    ) -> Result<Vec<AuditRecord>> {
        let sql = format!(
            "{SELECT_COLUMNS}
             WHERE entity_type = ?1 AND entity_id = ?2
             ORDER BY synced_at, id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![entity_type.as_str(), entity_id], row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Time of the latest successful sync, optionally narrowed by type and direction.
    pub fn last_success_time(
        &self,
        entity_type: Option<EntityType>,
        direction: Option<SyncDirection>,
    ) -> Result<Option<DateTime<Utc>>> {
        let latest: Option<String> = self.conn.query_row(
            "SELECT MAX(synced_at) FROM sync_log
             WHERE status = 'success'
               AND (?1 IS NULL OR entity_type = ?1)
               AND (?2 IS NULL OR direction = ?2)",
            params![
                entity_type.map(|t| t.as_str()),
                direction.map(|d| d.as_str())
            ],
            |row| row.get(0),
        )?;

        latest
            .map(|s| parse_timestamp(&s, "synced_at"))
            .transpose()
            .map_err(Into::into)
    }

    /// Delete records older than `cutoff`. Returns the number removed.
    pub fn purge_audit_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM sync_log WHERE synced_at < ?1",
            params![format_timestamp(&cutoff)],
        )?;
        Ok(deleted)
    }
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
