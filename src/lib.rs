//! Ripple-Frontier: the URI frontier of a polite, large-scale web crawler
//!
//! This crate decides which discovered URI is handed to which worker next. It
//! enforces per-site politeness, drops duplicate URIs, bounds the resources
//! spent on any one site and survives restarts through checkpoints.

pub mod checkpoint;
pub mod config;
pub mod frontier;
pub mod state;
pub mod storage;
pub mod uri;

use thiserror::Error;

pub use storage::StorageError;

/// Main error type for frontier operations
#[derive(Debug, Error)]
pub enum FrontierError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("URI error: {0}")]
    Uri(#[from] UriError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("URI {uri} is not in flight on queue {queue}")]
    NotInFlight { queue: String, uri: String },

    #[error("Unknown queue: {0}")]
    UnknownQueue(String),

    #[error("Invalid queue transition for {queue}: {from:?} -> {to:?}")]
    InvalidTransition {
        queue: String,
        from: state::QueueState,
        to: state::QueueState,
    },

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("Unsupported snapshot version {found} (expected {expected})")]
    SnapshotVersion { found: u32, expected: u32 },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// URI-specific errors
#[derive(Debug, Error)]
pub enum UriError {
    #[error("Failed to parse URI: {0}")]
    Parse(String),

    #[error("Invalid URI scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URI")]
    MissingHost,
}

/// Result type alias for frontier operations
pub type Result<T> = std::result::Result<T, FrontierError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URI operations
pub type UriResult<T> = std::result::Result<T, UriError>;

// Re-export commonly used types
pub use checkpoint::{CheckpointId, CheckpointManager};
pub use config::Config;
pub use frontier::{Frontier, FrontierStats, QueueReport};
pub use state::{Disposition, FetchStatus, QueueState};
pub use storage::{MemoryStorage, SqliteStorage, Storage};
pub use uri::{CandidateUri, Fingerprint};
