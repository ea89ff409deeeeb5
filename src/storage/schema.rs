//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the frontier database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Fingerprints of every URI ever scheduled, stored as order-preserving signed keys
CREATE TABLE IF NOT EXISTS fingerprints (
    fp INTEGER PRIMARY KEY
);

-- Pending URIs of every work queue
CREATE TABLE IF NOT EXISTS pending (
    queue_key TEXT NOT NULL,
    seq INTEGER NOT NULL,
    uri TEXT NOT NULL,
    PRIMARY KEY (queue_key, seq)
) WITHOUT ROWID;
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.pragma_update(None, "user_version", get_schema_version())?;
    Ok(())
}

/// Gets the current schema version
pub fn get_schema_version() -> u32 {
    1
}
