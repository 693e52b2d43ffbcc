//! Storage module for persisting audit results
//!
//! Audits are stored per client so a history of scores can be read back
//! later. The only backend is SQLite.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteAuditStore;
pub use traits::{AuditStore, StorageError, StorageResult};

use std::path::Path;

/// Opens (or creates) the audit database at `path`
pub fn open_store(path: &Path) -> StorageResult<SqliteAuditStore> {
    SqliteAuditStore::new(path)
}

/// One persisted audit row
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    pub id: i64,
    pub client_id: i64,
    pub url: String,
    pub seo_score: u32,
    pub page_speed_score: u32,
    pub mobile_score: u32,
    pub grade: String,
    /// Issue list serialized as JSON
    pub issues: String,
    /// Recommendation lines serialized as JSON
    pub recommendations: String,
    pub created_at: String,
}

impl AuditRecord {
    /// Decodes the stored recommendation lines
    pub fn recommendation_lines(&self) -> StorageResult<Vec<String>> {
        Ok(serde_json::from_str(&self.recommendations)?)
    }

    /// Decodes the stored issue list
    pub fn issue_list(&self) -> StorageResult<Vec<crate::Issue>> {
        Ok(serde_json::from_str(&self.issues)?)
    }
}
