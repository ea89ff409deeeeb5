use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Ripple-Frontier
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub politeness: PolitenessConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub budget: BudgetConfig,
    #[serde(default)]
    pub queues: QueuesConfig,
    #[serde(default)]
    pub canonicalization: CanonicalizationConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub checkpoint: CheckpointConfig,
    #[serde(default)]
    pub site: Vec<SiteEntry>,
}

/// Politeness delay configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PolitenessConfig {
    /// Multiplier applied to the duration of the last fetch
    #[serde(rename = "delay-factor", default = "default_delay_factor")]
    pub delay_factor: f64,

    /// Never recontact a site sooner than this (milliseconds)
    #[serde(rename = "min-delay-ms", default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    /// Never wait longer than this before recontacting a site (milliseconds)
    #[serde(rename = "max-delay-ms", default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl PolitenessConfig {
    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

impl Default for PolitenessConfig {
    fn default() -> Self {
        Self {
            delay_factor: default_delay_factor(),
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

/// How retryable failures are put back into their queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetryPolicy {
    /// Requeue at the head; the queue is immediately ready again
    #[default]
    Immediate,
    /// Requeue at the head and snooze the queue for an exponentially growing interval
    Backoff,
}

/// Retry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of dispatches for a URI that keeps failing retryably
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default)]
    pub policy: RetryPolicy,

    /// First backoff interval (milliseconds)
    #[serde(rename = "backoff-base-ms", default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Upper bound on any backoff interval (milliseconds)
    #[serde(rename = "backoff-max-ms", default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            policy: RetryPolicy::default(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_max_ms: default_backoff_max_ms(),
        }
    }
}

/// Per-queue resource ceilings; 0 means unlimited
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct BudgetConfig {
    #[serde(rename = "queue-byte-budget", default)]
    pub queue_byte_budget: u64,

    #[serde(rename = "queue-uri-budget", default)]
    pub queue_uri_budget: u64,
}

/// Queue activation behavior
#[derive(Debug, Clone, Deserialize)]
pub struct QueuesConfig {
    /// Whether new queues start inactive, only becoming ready when the frontier runs dry
    #[serde(rename = "hold-queues", default)]
    pub hold_queues: bool,

    /// Dispatches a held queue may make per activation before it rotates out (0 = unlimited)
    #[serde(
        rename = "balance-replenish-amount",
        default = "default_balance_replenish_amount"
    )]
    pub balance_replenish_amount: u64,

    /// Held queues snoozing longer than this go inactive instead (0 = never)
    #[serde(rename = "snooze-deactivate-ms", default = "default_snooze_deactivate_ms")]
    pub snooze_deactivate_ms: u64,

    /// Grace period after which an in-flight URI is considered stuck (0 disables)
    #[serde(rename = "stuck-grace-ms", default)]
    pub stuck_grace_ms: u64,
}

impl QueuesConfig {
    pub fn stuck_grace(&self) -> Option<Duration> {
        (self.stuck_grace_ms > 0).then(|| Duration::from_millis(self.stuck_grace_ms))
    }

    /// Session balance granted on activation; 0 when queues never rotate
    pub fn session_balance(&self) -> u64 {
        if self.hold_queues {
            self.balance_replenish_amount
        } else {
            0
        }
    }

    pub fn snooze_deactivate(&self) -> Option<Duration> {
        (self.hold_queues && self.snooze_deactivate_ms > 0)
            .then(|| Duration::from_millis(self.snooze_deactivate_ms))
    }
}

impl Default for QueuesConfig {
    fn default() -> Self {
        Self {
            hold_queues: false,
            balance_replenish_amount: default_balance_replenish_amount(),
            snooze_deactivate_ms: default_snooze_deactivate_ms(),
            stuck_grace_ms: 0,
        }
    }
}

/// Rules applied to a URI before its fingerprint is computed
#[derive(Debug, Clone, Deserialize)]
pub struct CanonicalizationConfig {
    #[serde(rename = "strip-www", default = "default_true")]
    pub strip_www: bool,

    /// Drop click-tracking and session-id query parameters before fingerprinting
    #[serde(rename = "strip-tracking-params", default = "default_true")]
    pub strip_tracking_params: bool,
}

impl Default for CanonicalizationConfig {
    fn default() -> Self {
        Self {
            strip_www: true,
            strip_tracking_params: true,
        }
    }
}

/// Which backend holds fingerprints and pending URIs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageBackend {
    #[default]
    Memory,
    Sqlite,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Path to the SQLite database file
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_storage_path(),
        }
    }
}

/// Checkpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CheckpointConfig {
    /// Directory holding one subdirectory per checkpoint
    #[serde(default = "default_checkpoint_dir")]
    pub directory: PathBuf,

    /// Seconds between automatic checkpoints (0 = operator-triggered only)
    #[serde(rename = "interval-secs", default)]
    pub interval_secs: u64,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            directory: default_checkpoint_dir(),
            interval_secs: 0,
        }
    }
}

/// Per-site overrides, matched by domain pattern (e.g. "*.example.com")
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteEntry {
    pub domain: String,

    #[serde(rename = "min-delay-ms", default)]
    pub min_delay_ms: Option<u64>,

    #[serde(rename = "queue-byte-budget", default)]
    pub queue_byte_budget: Option<u64>,

    #[serde(rename = "queue-uri-budget", default)]
    pub queue_uri_budget: Option<u64>,

    #[serde(default)]
    pub precedence: Option<u8>,

    /// Scheduling key forced onto every matching host
    #[serde(rename = "queue-key", default)]
    pub queue_key: Option<String>,
}

fn default_delay_factor() -> f64 {
    5.0
}

fn default_min_delay_ms() -> u64 {
    3_000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_max_retries() -> u32 {
    30
}

fn default_backoff_base_ms() -> u64 {
    1_000
}

fn default_backoff_max_ms() -> u64 {
    900_000
}

fn default_balance_replenish_amount() -> u64 {
    3_000
}

fn default_snooze_deactivate_ms() -> u64 {
    300_000
}

fn default_true() -> bool {
    true
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./frontier.db")
}

fn default_checkpoint_dir() -> PathBuf {
    PathBuf::from("./checkpoints")
}
