use crate::config::CanonicalizationConfig;
use crate::storage::{Storage, StorageResult};
use crate::uri::{fingerprint_of, CandidateUri, Fingerprint};
use std::sync::Arc;

/// The persistent set of fingerprints of every URI ever scheduled
///
/// A thin layer over the storage backend that owns the canonicalization rules,
/// so every caller fingerprints URIs the same way. Insertion atomicity comes
/// from the backend; no frontier lock is involved.
pub struct FingerprintStore<S: Storage> {
    storage: Arc<S>,
    rules: CanonicalizationConfig,
}

impl<S: Storage> FingerprintStore<S> {
    pub fn new(storage: Arc<S>, rules: CanonicalizationConfig) -> Self {
        Self { storage, rules }
    }

    pub fn fingerprint_of(&self, curi: &CandidateUri) -> Fingerprint {
        fingerprint_of(curi, &self.rules)
    }

    /// Returns true iff this call recorded the fingerprint
    ///
    /// A storage failure is returned as an error, never as "new".
    pub fn insert_if_absent(&self, fp: Fingerprint) -> StorageResult<bool> {
        self.storage.insert_fingerprint(fp)
    }

    pub fn remove(&self, fp: Fingerprint) -> StorageResult<bool> {
        self.storage.remove_fingerprint(fp)
    }

    pub fn contains(&self, fp: Fingerprint) -> StorageResult<bool> {
        self.storage.contains_fingerprint(fp)
    }

    pub fn count(&self) -> StorageResult<u64> {
        self.storage.count_fingerprints()
    }

    /// Collects every fingerprint in key order
    pub fn dump(&self) -> StorageResult<Vec<Fingerprint>> {
        let mut fingerprints = Vec::new();
        self.storage.for_each_fingerprint(&mut |fp| {
            fingerprints.push(fp);
            Ok(())
        })?;
        Ok(fingerprints)
    }

    /// Replaces nothing; adds every fingerprint to the set
    pub fn load(&self, fingerprints: &[Fingerprint]) -> StorageResult<()> {
        const BATCH: usize = 10_000;
        for chunk in fingerprints.chunks(BATCH) {
            self.storage.insert_fingerprints(chunk)?;
        }
        Ok(())
    }
}
