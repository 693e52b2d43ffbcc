//! Database schema for audit persistence

/// SQL for the audit tables
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS seo_audits (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    client_id INTEGER NOT NULL,
    url TEXT NOT NULL,
    seo_score INTEGER NOT NULL,
    page_speed_score INTEGER NOT NULL,
    mobile_score INTEGER NOT NULL,
    grade TEXT NOT NULL,
    issues TEXT NOT NULL,
    recommendations TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_seo_audits_client ON seo_audits(client_id, created_at);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
