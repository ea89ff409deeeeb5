use crate::checkpoint::snapshot::{self, CheckpointManifest, MANIFEST_FILE};
use crate::config::Config;
use crate::frontier::Frontier;
use crate::storage::Storage;
use crate::{FrontierError, Result};
use chrono::Utc;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

const TMP_PREFIX: &str = ".tmp-";
const MAX_COLLISIONS: u32 = 999;

/// Name of one checkpoint directory
///
/// Identifiers are UTC timestamps (`20260301T142530.125Z`), optionally
/// suffixed `-001`, `-002`... when two checkpoints land in the same
/// millisecond. Lexical order is creation order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CheckpointId(String);

impl CheckpointId {
    fn now() -> Self {
        Self(Utc::now().format("%Y%m%dT%H%M%S%.3fZ").to_string())
    }

    fn with_suffix(&self, n: u32) -> Self {
        Self(format!("{}-{:03}", self.0, n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CheckpointId {
    type Err = FrontierError;

    fn from_str(s: &str) -> Result<Self> {
        let valid = !s.is_empty()
            && !s.starts_with('.')
            && s
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
        if !valid {
            return Err(FrontierError::Checkpoint(format!(
                "invalid checkpoint id: {:?}",
                s
            )));
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for CheckpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Creates, lists, deletes and recovers checkpoints under one root directory
///
/// Each checkpoint is written into `<root>/.tmp-<id>/` and renamed to
/// `<root>/<id>/` only once complete, so a failed write never leaves a
/// half-written checkpoint behind under a real identifier.
#[derive(Debug, Clone)]
pub struct CheckpointManager {
    root: PathBuf,
}

impl CheckpointManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, id: &CheckpointId) -> PathBuf {
        self.root.join(id.as_str())
    }

    /// Snapshots `frontier` and publishes it as a new checkpoint
    pub fn create<S: Storage>(&self, frontier: &Frontier<S>) -> Result<CheckpointId> {
        fs::create_dir_all(&self.root)?;
        let snapshot = frontier.snapshot()?;
        let id = self.fresh_id()?;

        let tmp = self.root.join(format!("{}{}", TMP_PREFIX, id));
        let published = self.path_for(&id);

        let written = fs::create_dir_all(&tmp)
            .map_err(FrontierError::from)
            .and_then(|_| snapshot.write_to(&tmp, id.as_str()))
            .and_then(|manifest| {
                fs::rename(&tmp, &published)?;
                Ok(manifest)
            });

        let manifest = match written {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::error!("Failed to write checkpoint {}: {}", id, e);
                if let Err(cleanup) = fs::remove_dir_all(&tmp) {
                    if cleanup.kind() != ErrorKind::NotFound {
                        tracing::warn!("Could not remove {}: {}", tmp.display(), cleanup);
                    }
                }
                return Err(e);
            }
        };

        tracing::info!(
            "Checkpoint {} written: {} queues, {} pending URIs, {} fingerprints",
            id,
            manifest.queue_count,
            manifest.pending_count,
            manifest.fingerprint_count
        );
        Ok(id)
    }

    fn fresh_id(&self) -> Result<CheckpointId> {
        let base = CheckpointId::now();
        if !self.path_for(&base).exists() {
            return Ok(base);
        }
        (1..=MAX_COLLISIONS)
            .map(|n| base.with_suffix(n))
            .find(|id| !self.path_for(id).exists())
            .ok_or_else(|| {
                FrontierError::Checkpoint(format!("too many checkpoints named {}", base))
            })
    }

    /// Complete checkpoints, oldest first
    pub fn list(&self) -> Result<Vec<CheckpointId>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let Ok(id) = name.parse::<CheckpointId>() else {
                continue;
            };
            if entry.path().join(MANIFEST_FILE).is_file() {
                ids.push(id);
            }
        }

        ids.sort();
        Ok(ids)
    }

    pub fn latest(&self) -> Result<Option<CheckpointId>> {
        Ok(self.list()?.pop())
    }

    pub fn delete(&self, id: &CheckpointId) -> Result<()> {
        let path = self.path_for(id);
        if !path.is_dir() {
            return Err(FrontierError::Checkpoint(format!("no checkpoint {}", id)));
        }
        fs::remove_dir_all(&path)?;
        tracing::info!("Deleted checkpoint {}", id);
        Ok(())
    }

    pub fn read_manifest(&self, id: &CheckpointId) -> Result<CheckpointManifest> {
        snapshot::read_manifest(&self.path_for(id))
    }

    /// Rebuilds a frontier from the named checkpoint
    pub fn recover<S: Storage>(
        &self,
        id: &CheckpointId,
        config: Config,
        storage: S,
    ) -> Result<Frontier<S>> {
        let path = self.path_for(id);
        if !path.is_dir() {
            return Err(FrontierError::Checkpoint(format!("no checkpoint {}", id)));
        }
        Frontier::recover(config, storage, &path)
    }

    /// Rebuilds a frontier from the newest checkpoint, if there is one
    pub fn recover_latest<S: Storage>(
        &self,
        config: Config,
        storage: S,
    ) -> Result<Option<Frontier<S>>> {
        match self.latest()? {
            Some(id) => self.recover(&id, config, storage).map(Some),
            None => Ok(None),
        }
    }

    /// Writes a checkpoint every `interval` until the frontier terminates
    ///
    /// Failures are logged; the task keeps running.
    pub fn spawn_periodic<S: Storage + 'static>(
        &self,
        frontier: Arc<Frontier<S>>,
        interval: Duration,
    ) -> JoinHandle<()> {
        let manager = self.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if frontier.is_terminated() {
                    break;
                }

                let manager = manager.clone();
                let frontier = Arc::clone(&frontier);
                match tokio::task::spawn_blocking(move || manager.create(frontier.as_ref())).await {
                    Ok(Ok(id)) => tracing::debug!("Periodic checkpoint {} done", id),
                    Ok(Err(e)) => tracing::error!("Periodic checkpoint failed: {}", e),
                    Err(e) => tracing::error!("Periodic checkpoint task panicked: {}", e),
                }
            }
        })
    }
}
