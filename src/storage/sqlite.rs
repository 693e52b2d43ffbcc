//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the AuditStore trait.

use crate::audit::AuditReport;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{AuditStore, StorageError, StorageResult};
use crate::storage::AuditRecord;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite audit store
pub struct SqliteAuditStore {
    conn: Connection,
}

impl SqliteAuditStore {
    /// Opens or creates the database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Looks up a single audit by row ID
    pub fn audit(&self, id: i64) -> StorageResult<Option<AuditRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT id, client_id, url, seo_score, page_speed_score, mobile_score, grade,
                        issues, recommendations, created_at
                 FROM seo_audits WHERE id = ?1",
                params![id],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<AuditRecord> {
    Ok(AuditRecord {
        id: row.get(0)?,
        client_id: row.get(1)?,
        url: row.get(2)?,
        seo_score: row.get(3)?,
        page_speed_score: row.get(4)?,
        mobile_score: row.get(5)?,
        grade: row.get(6)?,
        issues: row.get(7)?,
        recommendations: row.get(8)?,
        created_at: row.get(9)?,
    })
}

impl AuditStore for SqliteAuditStore {
    fn save_audit(&mut self, client_id: i64, report: &AuditReport) -> StorageResult<i64> {
        let issues = serde_json::to_string(&report.issues)?;
        let recommendations = serde_json::to_string(&report.recommendations)?;
        let now = Utc::now().to_rfc3339();

        let inserted = self.conn.execute(
            "INSERT INTO seo_audits
                (client_id, url, seo_score, page_speed_score, mobile_score, grade,
                 issues, recommendations, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                client_id,
                report.url,
                report.overall_score,
                report.section_score("page_speed"),
                report.section_score("mobile_friendly"),
                report.grade.as_str(),
                issues,
                recommendations,
                now,
            ],
        )?;
        if inserted != 1 {
            return Err(StorageError::Database(format!(
                "expected one inserted audit row, got {}",
                inserted
            )));
        }

        Ok(self.conn.last_insert_rowid())
    }

    fn audits_for_client(&self, client_id: i64) -> StorageResult<Vec<AuditRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, client_id, url, seo_score, page_speed_score, mobile_score, grade,
                    issues, recommendations, created_at
             FROM seo_audits
             WHERE client_id = ?1
             ORDER BY created_at DESC, id DESC",
        )?;

        let records = stmt
            .query_map(params![client_id], row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}
