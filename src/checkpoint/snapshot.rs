//! Versioned snapshot structures and their on-disk encoding
//!
//! A checkpoint directory holds three files:
//! - `manifest.json`: version, identifier, creation time and counters
//! - `queues.json`: every work queue with its pending URIs
//! - `fingerprints.bin`: the fingerprint set as big-endian u64s in key order
//!
//! The manifest is written last, so a directory without one is incomplete.

use crate::frontier::FrontierStats;
use crate::state::QueueState;
use crate::uri::{CandidateUri, Fingerprint};
use crate::{FrontierError, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

/// Snapshot format version; bumped on any incompatible change
pub const SNAPSHOT_VERSION: u32 = 1;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const QUEUES_FILE: &str = "queues.json";
pub const FINGERPRINTS_FILE: &str = "fingerprints.bin";

/// Summary of a checkpoint, readable without loading the rest of it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointManifest {
    pub version: u32,
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub stats: FrontierStats,
    pub queue_count: usize,
    pub pending_count: u64,
    pub fingerprint_count: u64,
}

/// One pending URI with its position in its queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingItem {
    pub seq: i64,
    pub uri: CandidateUri,
}

/// Everything needed to rebuild one work queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    pub key: String,
    pub state: QueueState,
    pub precedence: u8,
    #[serde(default)]
    pub precedence_pinned: bool,
    pub next_head_seq: i64,
    pub next_tail_seq: i64,
    pub bytes_charged: u64,
    pub uris_charged: u64,
    pub byte_budget: u64,
    pub uri_budget: u64,
    pub total_bytes: u64,
    pub total_uris: u64,
    pub retries: u64,
    #[serde(default)]
    pub site_min_delay_ms: Option<u64>,

    /// Time left on the snooze when the checkpoint was taken
    #[serde(default)]
    pub snooze_remaining_ms: Option<u64>,

    #[serde(default)]
    pub retire_on_completion: bool,

    /// Dispatches granted to the current activation (0 = unlimited)
    #[serde(default)]
    pub session_balance: u64,

    #[serde(default)]
    pub session_spent: u64,

    /// The URI that was dispatched but not yet finished
    #[serde(default)]
    pub in_flight: Option<CandidateUri>,

    pub pending: Vec<PendingItem>,
}

/// The whole queue directory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectorySnapshot {
    pub queues: Vec<QueueSnapshot>,

    /// Inactive queue keys in activation order
    #[serde(default)]
    pub inactive: Vec<String>,
}

impl DirectorySnapshot {
    pub fn pending_count(&self) -> u64 {
        self.queues
            .iter()
            .map(|q| q.pending.len() as u64 + u64::from(q.in_flight.is_some()))
            .sum()
    }
}

/// A logically consistent image of a frontier
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontierSnapshot {
    pub stats: FrontierStats,
    pub directory: DirectorySnapshot,
    pub fingerprints: Vec<Fingerprint>,
}

impl FrontierSnapshot {
    /// Writes the snapshot files into `dir`, manifest last
    pub fn write_to(&self, dir: &Path, id: &str) -> Result<CheckpointManifest> {
        let manifest = CheckpointManifest {
            version: SNAPSHOT_VERSION,
            id: id.to_string(),
            created_at: Utc::now(),
            stats: self.stats.clone(),
            queue_count: self.directory.queues.len(),
            pending_count: self.directory.pending_count(),
            fingerprint_count: self.fingerprints.len() as u64,
        };

        write_json(&dir.join(QUEUES_FILE), &self.directory)?;
        write_fingerprints(&dir.join(FINGERPRINTS_FILE), &self.fingerprints)?;
        write_json(&dir.join(MANIFEST_FILE), &manifest)?;

        Ok(manifest)
    }

    /// Reads a snapshot back from a checkpoint directory
    pub fn read_from(dir: &Path) -> Result<(CheckpointManifest, Self)> {
        let manifest = read_manifest(dir)?;
        let directory: DirectorySnapshot = read_json(&dir.join(QUEUES_FILE))?;
        let fingerprints = read_fingerprints(&dir.join(FINGERPRINTS_FILE))?;

        if fingerprints.len() as u64 != manifest.fingerprint_count {
            return Err(FrontierError::Checkpoint(format!(
                "{} holds {} fingerprints, manifest says {}",
                dir.display(),
                fingerprints.len(),
                manifest.fingerprint_count
            )));
        }

        let snapshot = Self {
            stats: manifest.stats.clone(),
            directory,
            fingerprints,
        };
        Ok((manifest, snapshot))
    }
}

/// Reads and version-checks the manifest of a checkpoint directory
pub fn read_manifest(dir: &Path) -> Result<CheckpointManifest> {
    let manifest: CheckpointManifest = read_json(&dir.join(MANIFEST_FILE))?;
    if manifest.version != SNAPSHOT_VERSION {
        return Err(FrontierError::SnapshotVersion {
            found: manifest.version,
            expected: SNAPSHOT_VERSION,
        });
    }
    Ok(manifest)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn write_fingerprints(path: &Path, fingerprints: &[Fingerprint]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for fp in fingerprints {
        writer.write_all(&fp.to_be_bytes())?;
    }
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}

fn read_fingerprints(path: &Path) -> Result<Vec<Fingerprint>> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut fingerprints = Vec::new();
    let mut buf = [0u8; 8];

    loop {
        match reader.read_exact(&mut buf) {
            Ok(()) => fingerprints.push(Fingerprint::from_be_bytes(buf)),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(fingerprints)
}
