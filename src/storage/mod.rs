//! Storage module for persisting frontier data
//!
//! This module holds the fingerprint set and the pending URIs of every work
//! queue behind the [`Storage`] trait, with two interchangeable backends:
//! - [`MemoryStorage`] for tests and small crawls
//! - [`SqliteStorage`] for crawls that outgrow memory

mod memory;
mod schema;
mod sqlite;
mod traits;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::config::{StorageBackend, StorageConfig};
use std::sync::Arc;

/// Opens the backend selected by the configuration
///
/// # Returns
///
/// * `Ok(Arc<dyn Storage>)` - The opened backend
/// * `Err(StorageError)` - Failed to open the SQLite database
pub fn open_storage(config: &StorageConfig) -> StorageResult<Arc<dyn Storage>> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryStorage::new())),
        StorageBackend::Sqlite => Ok(Arc::new(SqliteStorage::new(&config.path)?)),
    }
}

impl<S: Storage + ?Sized> Storage for Arc<S> {
    fn insert_fingerprint(&self, fp: crate::Fingerprint) -> StorageResult<bool> {
        (**self).insert_fingerprint(fp)
    }

    fn remove_fingerprint(&self, fp: crate::Fingerprint) -> StorageResult<bool> {
        (**self).remove_fingerprint(fp)
    }

    fn contains_fingerprint(&self, fp: crate::Fingerprint) -> StorageResult<bool> {
        (**self).contains_fingerprint(fp)
    }

    fn count_fingerprints(&self) -> StorageResult<u64> {
        (**self).count_fingerprints()
    }

    fn for_each_fingerprint(
        &self,
        visit: &mut dyn FnMut(crate::Fingerprint) -> StorageResult<()>,
    ) -> StorageResult<()> {
        (**self).for_each_fingerprint(visit)
    }

    fn insert_fingerprints(&self, fps: &[crate::Fingerprint]) -> StorageResult<()> {
        (**self).insert_fingerprints(fps)
    }

    fn put_pending(&self, queue: &str, seq: i64, curi: &crate::CandidateUri) -> StorageResult<()> {
        (**self).put_pending(queue, seq, curi)
    }

    fn get_pending(&self, queue: &str, seq: i64) -> StorageResult<Option<crate::CandidateUri>> {
        (**self).get_pending(queue, seq)
    }

    fn delete_pending(&self, queue: &str, seq: i64) -> StorageResult<bool> {
        (**self).delete_pending(queue, seq)
    }

    fn first_pending(&self, queue: &str) -> StorageResult<Option<(i64, crate::CandidateUri)>> {
        (**self).first_pending(queue)
    }

    fn pending_for(&self, queue: &str) -> StorageResult<Vec<(i64, crate::CandidateUri)>> {
        (**self).pending_for(queue)
    }

    fn delete_queue(&self, queue: &str) -> StorageResult<u64> {
        (**self).delete_queue(queue)
    }

    fn count_pending(&self, queue: &str) -> StorageResult<u64> {
        (**self).count_pending(queue)
    }

    fn clear(&self) -> StorageResult<()> {
        (**self).clear()
    }
}
