//! Configuration module for Ripple-Frontier
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; omitted values fall back to the defaults the
//! frontier has always shipped with (5x delay factor, 3s..30s politeness window,
//! 30 retries, unlimited budgets, in-memory storage).
//!
//! # Example
//!
//! ```no_run
//! use ripple_frontier::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("frontier.toml")).unwrap();
//! println!("Frontier will retry up to {} times", config.retry.max_retries);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    BudgetConfig, CanonicalizationConfig, CheckpointConfig, Config, PolitenessConfig,
    QueuesConfig, RetryConfig, RetryPolicy, SiteEntry, StorageBackend, StorageConfig,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

use crate::uri::matches_wildcard;

impl Config {
    /// Returns the first `[[site]]` entry whose pattern matches the host
    pub fn site_for(&self, host: &str) -> Option<&SiteEntry> {
        self.site
            .iter()
            .find(|entry| matches_wildcard(&entry.domain, host))
    }
}
