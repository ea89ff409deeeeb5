//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::uri::{CandidateUri, Fingerprint};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// A backend holds two ordered collections: the set of fingerprints of every
/// URI ever scheduled, and the pending URIs of every work queue keyed by
/// `(scheduling key, sequence number)`. Implementations must be safe to share
/// between threads; every method takes `&self`.
pub trait Storage: Send + Sync {
    // ===== Fingerprints =====

    /// Inserts a fingerprint if it is not already present
    ///
    /// Returns `true` iff this call performed the insertion. Concurrent calls
    /// with the same fingerprint must yield exactly one `true`.
    fn insert_fingerprint(&self, fp: Fingerprint) -> StorageResult<bool>;

    /// Removes a fingerprint, returning whether it was present
    fn remove_fingerprint(&self, fp: Fingerprint) -> StorageResult<bool>;

    fn contains_fingerprint(&self, fp: Fingerprint) -> StorageResult<bool>;

    fn count_fingerprints(&self) -> StorageResult<u64>;

    /// Visits every fingerprint in ascending order
    fn for_each_fingerprint(
        &self,
        visit: &mut dyn FnMut(Fingerprint) -> StorageResult<()>,
    ) -> StorageResult<()>;

    /// Bulk-inserts fingerprints, ignoring ones already present
    fn insert_fingerprints(&self, fps: &[Fingerprint]) -> StorageResult<()>;

    // ===== Pending URIs =====

    /// Stores a pending URI under `(queue, seq)`, replacing any previous item
    fn put_pending(&self, queue: &str, seq: i64, curi: &CandidateUri) -> StorageResult<()>;

    fn get_pending(&self, queue: &str, seq: i64) -> StorageResult<Option<CandidateUri>>;

    /// Deletes a pending URI, returning whether it existed
    fn delete_pending(&self, queue: &str, seq: i64) -> StorageResult<bool>;

    /// Returns the pending URI with the lowest sequence number in a queue
    fn first_pending(&self, queue: &str) -> StorageResult<Option<(i64, CandidateUri)>>;

    /// Returns all pending URIs of a queue in sequence order
    fn pending_for(&self, queue: &str) -> StorageResult<Vec<(i64, CandidateUri)>>;

    /// Deletes every pending URI of a queue, returning how many were removed
    fn delete_queue(&self, queue: &str) -> StorageResult<u64>;

    fn count_pending(&self, queue: &str) -> StorageResult<u64>;

    // ===== Maintenance =====

    /// Removes all fingerprints and pending URIs
    fn clear(&self) -> StorageResult<()>;
}
