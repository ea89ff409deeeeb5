//! In-memory storage implementation
//!
//! Keeps fingerprints and pending URIs in ordered maps. Suitable for tests and
//! for crawls small enough to fit in memory; durability comes from checkpoints.

use crate::storage::traits::{Storage, StorageResult};
use crate::uri::{CandidateUri, Fingerprint};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

type PendingMap = HashMap<String, BTreeMap<i64, CandidateUri>>;

/// Storage backend holding everything in process memory
#[derive(Debug, Default)]
pub struct MemoryStorage {
    fingerprints: Mutex<BTreeSet<u64>>,
    pending: Mutex<PendingMap>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn fingerprints(&self) -> MutexGuard<'_, BTreeSet<u64>> {
        self.fingerprints
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn pending(&self) -> MutexGuard<'_, PendingMap> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Storage for MemoryStorage {
    fn insert_fingerprint(&self, fp: Fingerprint) -> StorageResult<bool> {
        Ok(self.fingerprints().insert(fp.as_u64()))
    }

    fn remove_fingerprint(&self, fp: Fingerprint) -> StorageResult<bool> {
        Ok(self.fingerprints().remove(&fp.as_u64()))
    }

    fn contains_fingerprint(&self, fp: Fingerprint) -> StorageResult<bool> {
        Ok(self.fingerprints().contains(&fp.as_u64()))
    }

    fn count_fingerprints(&self) -> StorageResult<u64> {
        Ok(self.fingerprints().len() as u64)
    }

    fn for_each_fingerprint(
        &self,
        visit: &mut dyn FnMut(Fingerprint) -> StorageResult<()>,
    ) -> StorageResult<()> {
        let fingerprints = self.fingerprints();
        for fp in fingerprints.iter() {
            visit(Fingerprint::from_u64(*fp))?;
        }
        Ok(())
    }

    fn insert_fingerprints(&self, fps: &[Fingerprint]) -> StorageResult<()> {
        self.fingerprints()
            .extend(fps.iter().map(Fingerprint::as_u64));
        Ok(())
    }

    fn put_pending(&self, queue: &str, seq: i64, curi: &CandidateUri) -> StorageResult<()> {
        self.pending()
            .entry(queue.to_string())
            .or_default()
            .insert(seq, curi.clone());
        Ok(())
    }

    fn get_pending(&self, queue: &str, seq: i64) -> StorageResult<Option<CandidateUri>> {
        Ok(self
            .pending()
            .get(queue)
            .and_then(|items| items.get(&seq))
            .cloned())
    }

    fn delete_pending(&self, queue: &str, seq: i64) -> StorageResult<bool> {
        let mut pending = self.pending();
        let Some(items) = pending.get_mut(queue) else {
            return Ok(false);
        };
        let removed = items.remove(&seq).is_some();
        if items.is_empty() {
            pending.remove(queue);
        }
        Ok(removed)
    }

    fn first_pending(&self, queue: &str) -> StorageResult<Option<(i64, CandidateUri)>> {
        Ok(self.pending().get(queue).and_then(|items| {
            items
                .first_key_value()
                .map(|(seq, curi)| (*seq, curi.clone()))
        }))
    }

    fn pending_for(&self, queue: &str) -> StorageResult<Vec<(i64, CandidateUri)>> {
        Ok(self
            .pending()
            .get(queue)
            .map(|items| {
                items
                    .iter()
                    .map(|(seq, curi)| (*seq, curi.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn delete_queue(&self, queue: &str) -> StorageResult<u64> {
        Ok(self
            .pending()
            .remove(queue)
            .map(|items| items.len() as u64)
            .unwrap_or(0))
    }

    fn count_pending(&self, queue: &str) -> StorageResult<u64> {
        Ok(self
            .pending()
            .get(queue)
            .map(|items| items.len() as u64)
            .unwrap_or(0))
    }

    fn clear(&self) -> StorageResult<()> {
        self.fingerprints().clear();
        self.pending().clear();
        Ok(())
    }
}
