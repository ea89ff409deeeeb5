//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageResult};
use crate::uri::{CandidateUri, Fingerprint};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// SQLite storage backend
///
/// A single connection guarded by a mutex. Fingerprint insertion relies on
/// `INSERT OR IGNORE` plus the affected-row count, so it stays atomic without
/// any lock held by the caller.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            PRAGMA mmap_size = 268435456;
        ",
        )?;

        initialize_schema(&conn)?;

        tracing::debug!("Opened frontier database at {}", path.display());

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Storage for SqliteStorage {
    // ===== Fingerprints =====

    fn insert_fingerprint(&self, fp: Fingerprint) -> StorageResult<bool> {
        let changed = self.conn().execute(
            "INSERT OR IGNORE INTO fingerprints (fp) VALUES (?1)",
            params![fp.to_sql_key()],
        )?;
        Ok(changed == 1)
    }

    fn remove_fingerprint(&self, fp: Fingerprint) -> StorageResult<bool> {
        let changed = self.conn().execute(
            "DELETE FROM fingerprints WHERE fp = ?1",
            params![fp.to_sql_key()],
        )?;
        Ok(changed == 1)
    }

    fn contains_fingerprint(&self, fp: Fingerprint) -> StorageResult<bool> {
        let found = self
            .conn()
            .query_row(
                "SELECT 1 FROM fingerprints WHERE fp = ?1",
                params![fp.to_sql_key()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn count_fingerprints(&self) -> StorageResult<u64> {
        let count: i64 =
            self.conn()
                .query_row("SELECT COUNT(*) FROM fingerprints", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn for_each_fingerprint(
        &self,
        visit: &mut dyn FnMut(Fingerprint) -> StorageResult<()>,
    ) -> StorageResult<()> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT fp FROM fingerprints ORDER BY fp")?;
        let keys = stmt.query_map([], |row| row.get::<_, i64>(0))?;

        for key in keys {
            visit(Fingerprint::from_sql_key(key?))?;
        }
        Ok(())
    }

    fn insert_fingerprints(&self, fps: &[Fingerprint]) -> StorageResult<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare("INSERT OR IGNORE INTO fingerprints (fp) VALUES (?1)")?;
            for fp in fps {
                stmt.execute(params![fp.to_sql_key()])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    // ===== Pending URIs =====

    fn put_pending(&self, queue: &str, seq: i64, curi: &CandidateUri) -> StorageResult<()> {
        let json = serde_json::to_string(curi)?;
        self.conn().execute(
            "INSERT OR REPLACE INTO pending (queue_key, seq, uri) VALUES (?1, ?2, ?3)",
            params![queue, seq, json],
        )?;
        Ok(())
    }

    fn get_pending(&self, queue: &str, seq: i64) -> StorageResult<Option<CandidateUri>> {
        let json: Option<String> = self
            .conn()
            .query_row(
                "SELECT uri FROM pending WHERE queue_key = ?1 AND seq = ?2",
                params![queue, seq],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn delete_pending(&self, queue: &str, seq: i64) -> StorageResult<bool> {
        let changed = self.conn().execute(
            "DELETE FROM pending WHERE queue_key = ?1 AND seq = ?2",
            params![queue, seq],
        )?;
        Ok(changed == 1)
    }

    fn first_pending(&self, queue: &str) -> StorageResult<Option<(i64, CandidateUri)>> {
        let row: Option<(i64, String)> = self
            .conn()
            .query_row(
                "SELECT seq, uri FROM pending WHERE queue_key = ?1 ORDER BY seq LIMIT 1",
                params![queue],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((seq, json)) => Ok(Some((seq, serde_json::from_str(&json)?))),
            None => Ok(None),
        }
    }

    fn pending_for(&self, queue: &str) -> StorageResult<Vec<(i64, CandidateUri)>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT seq, uri FROM pending WHERE queue_key = ?1 ORDER BY seq")?;
        let rows = stmt.query_map(params![queue], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut items = Vec::new();
        for row in rows {
            let (seq, json) = row?;
            items.push((seq, serde_json::from_str(&json)?));
        }
        Ok(items)
    }

    fn delete_queue(&self, queue: &str) -> StorageResult<u64> {
        let changed = self
            .conn()
            .execute("DELETE FROM pending WHERE queue_key = ?1", params![queue])?;
        Ok(changed as u64)
    }

    fn count_pending(&self, queue: &str) -> StorageResult<u64> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM pending WHERE queue_key = ?1",
            params![queue],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    // ===== Maintenance =====

    fn clear(&self) -> StorageResult<()> {
        self.conn()
            .execute_batch("DELETE FROM fingerprints; DELETE FROM pending;")?;
        Ok(())
    }
}
