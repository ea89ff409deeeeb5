//! Checkpoint module for Ripple-Frontier
//!
//! A checkpoint is an immutable directory holding the fingerprint set, every
//! work queue and the frontier counters. It is written while the frontier keeps
//! running and read back only at start-up to continue an interrupted crawl.
//!
//! # Example
//!
//! ```no_run
//! use ripple_frontier::{CheckpointManager, Config, MemoryStorage};
//!
//! # fn run() -> ripple_frontier::Result<()> {
//! let manager = CheckpointManager::new("./checkpoints");
//! if let Some(frontier) = manager.recover_latest(Config::default(), MemoryStorage::new())? {
//!     println!("{} URIs still pending", frontier.pending_count());
//! }
//! # Ok(())
//! # }
//! ```

mod manager;
mod snapshot;

pub use manager::{CheckpointId, CheckpointManager};
pub use snapshot::{
    read_manifest, CheckpointManifest, DirectorySnapshot, FrontierSnapshot, PendingItem,
    QueueSnapshot, FINGERPRINTS_FILE, MANIFEST_FILE, QUEUES_FILE, SNAPSHOT_VERSION,
};
