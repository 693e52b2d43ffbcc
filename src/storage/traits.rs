//! Storage trait definitions
//!
//! The audit engine only needs two operations from a store, so the trait is
//! kept narrow enough for alternative backends.

use crate::audit::AuditReport;
use crate::storage::AuditRecord;
use thiserror::Error;

/// Storage-specific errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for audit storage backends
pub trait AuditStore {
    /// Persists a finished audit for a client
    ///
    /// # Returns
    ///
    /// The row ID of the stored audit
    fn save_audit(&mut self, client_id: i64, report: &AuditReport) -> StorageResult<i64>;

    /// Returns every audit stored for `client_id`, newest first
    fn audits_for_client(&self, client_id: i64) -> StorageResult<Vec<AuditRecord>>;
}
