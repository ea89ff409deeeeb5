//! Ripple-Frontier main entry point
//!
//! This is the operator command-line interface for the Ripple-Frontier URI
//! frontier: it validates configuration and manages checkpoints.

use anyhow::{bail, Context};
use clap::Parser;
use ripple_frontier::checkpoint::CheckpointId;
use ripple_frontier::config::{load_config_with_hash, Config, RetryPolicy, StorageBackend};
use ripple_frontier::{CheckpointManager, Frontier, MemoryStorage};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Ripple-Frontier: the URI frontier of a polite web crawler
///
/// Ripple-Frontier decides which URI a crawler fetches next, keeping every
/// site at a polite distance, dropping duplicates and surviving restarts
/// through checkpoints.
#[derive(Parser, Debug)]
#[command(name = "ripple-frontier")]
#[command(version = "1.0.0")]
#[command(about = "URI frontier for a polite web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// List the checkpoints in the configured checkpoint directory and exit
    #[arg(long, conflicts_with_all = ["inspect", "queues", "delete_checkpoint"])]
    list_checkpoints: bool,

    /// Show the manifest of a checkpoint and exit
    #[arg(long, value_name = "ID", conflicts_with_all = ["queues", "delete_checkpoint"])]
    inspect: Option<String>,

    /// Load a checkpoint into memory and report every work queue
    #[arg(long, value_name = "ID", conflicts_with = "delete_checkpoint")]
    queues: Option<String>,

    /// Delete a checkpoint and exit
    #[arg(long, value_name = "ID")]
    delete_checkpoint: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e).context("invalid configuration");
        }
    };

    let manager = CheckpointManager::new(&config.checkpoint.directory);

    if cli.list_checkpoints {
        handle_list(&manager)?;
    } else if let Some(id) = cli.inspect {
        handle_inspect(&manager, &id)?;
    } else if let Some(id) = cli.queues {
        handle_queues(&manager, &id, config)?;
    } else if let Some(id) = cli.delete_checkpoint {
        let id: CheckpointId = id.parse()?;
        manager.delete(&id)?;
        println!("✓ Deleted checkpoint {}", id);
    } else {
        handle_dry_run(&config, &config_hash);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ripple_frontier=info,warn"),
            1 => EnvFilter::new("ripple_frontier=debug,info"),
            2 => EnvFilter::new("ripple_frontier=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Default mode: shows the effective configuration
fn handle_dry_run(config: &Config, config_hash: &str) {
    println!("=== Ripple-Frontier Configuration ===\n");
    println!("Hash: {}", config_hash);

    println!("\nPoliteness:");
    println!("  Delay factor: {}x fetch time", config.politeness.delay_factor);
    println!(
        "  Delay window: {}ms .. {}ms",
        config.politeness.min_delay_ms, config.politeness.max_delay_ms
    );

    println!("\nRetries:");
    println!("  Max attempts: {}", config.retry.max_retries);
    match config.retry.policy {
        RetryPolicy::Immediate => println!("  Policy: immediate"),
        RetryPolicy::Backoff => println!(
            "  Policy: backoff ({}ms doubling up to {}ms)",
            config.retry.backoff_base_ms, config.retry.backoff_max_ms
        ),
    }

    println!("\nQueues:");
    println!("  Hold queues: {}", config.queues.hold_queues);
    if config.queues.hold_queues {
        println!(
            "  Dispatches per activation: {}",
            describe_budget(config.queues.balance_replenish_amount)
        );
        match config.queues.snooze_deactivate() {
            Some(limit) => println!("  Deactivate snoozes over: {:?}", limit),
            None => println!("  Deactivate long snoozes: off"),
        }
    }
    println!(
        "  Byte budget: {}",
        describe_budget(config.budget.queue_byte_budget)
    );
    println!(
        "  URI budget: {}",
        describe_budget(config.budget.queue_uri_budget)
    );
    match config.queues.stuck_grace() {
        Some(grace) => println!("  Stuck watchdog: after {:?}", grace),
        None => println!("  Stuck watchdog: off"),
    }

    println!("\nStorage:");
    match config.storage.backend {
        StorageBackend::Memory => println!("  Backend: memory"),
        StorageBackend::Sqlite => {
            println!("  Backend: sqlite ({})", config.storage.path.display())
        }
    }
    println!(
        "  Checkpoints: {}",
        config.checkpoint.directory.display()
    );
    if config.checkpoint.interval_secs > 0 {
        println!("  Every {}s", config.checkpoint.interval_secs);
    }

    println!("\nSite Overrides ({}):", config.site.len());
    for entry in &config.site {
        println!("  - {}", entry.domain);
        if let Some(key) = &entry.queue_key {
            println!("    queue key: {}", key);
        }
        if let Some(delay) = entry.min_delay_ms {
            println!("    min delay: {}ms", delay);
        }
        if let Some(precedence) = entry.precedence {
            println!("    precedence: {}", precedence);
        }
    }

    println!("\n✓ Configuration is valid");
}

fn describe_budget(budget: u64) -> String {
    if budget == 0 {
        "unlimited".to_string()
    } else {
        budget.to_string()
    }
}

/// Handles --list-checkpoints
fn handle_list(manager: &CheckpointManager) -> anyhow::Result<()> {
    let ids = manager.list()?;
    println!("Checkpoints in {} ({}):", manager.root().display(), ids.len());

    for id in ids {
        match manager.read_manifest(&id) {
            Ok(manifest) => println!(
                "  {}  {} queues, {} pending, {} fingerprints",
                id, manifest.queue_count, manifest.pending_count, manifest.fingerprint_count
            ),
            Err(e) => println!("  {}  (unreadable: {})", id, e),
        }
    }

    Ok(())
}

/// Handles --inspect
fn handle_inspect(manager: &CheckpointManager, id: &str) -> anyhow::Result<()> {
    let id: CheckpointId = id.parse()?;
    let manifest = manager
        .read_manifest(&id)
        .with_context(|| format!("cannot read checkpoint {}", id))?;

    println!("=== Checkpoint {} ===\n", manifest.id);
    println!("Format version: {}", manifest.version);
    println!("Created: {}", manifest.created_at.to_rfc3339());
    println!("Queues: {}", manifest.queue_count);
    println!("Pending URIs: {}", manifest.pending_count);
    println!("Fingerprints: {}", manifest.fingerprint_count);

    let stats = &manifest.stats;
    println!("\nCounters:");
    println!("  Scheduled: {}", stats.scheduled);
    println!("  Duplicates: {}", stats.duplicates);
    println!("  Succeeded: {}", stats.succeeded);
    println!("  Failed: {} ({} disregarded)", stats.failed, stats.disregarded);
    println!("  Retried: {}", stats.retried);
    println!("  Discarded: {}", stats.discarded);
    println!("  Bytes: {}", stats.total_bytes);

    Ok(())
}

/// Handles --queues: recovers into memory so the on-disk backend is untouched
fn handle_queues(manager: &CheckpointManager, id: &str, config: Config) -> anyhow::Result<()> {
    let id: CheckpointId = id.parse()?;
    if !manager.path_for(&id).is_dir() {
        bail!("no checkpoint {} in {}", id, manager.root().display());
    }

    let frontier: Frontier<MemoryStorage> = manager.recover(&id, config, MemoryStorage::new())?;
    let reports = frontier.queue_reports();

    println!("=== Queues in {} ({}) ===\n", id, reports.len());
    for (state, count) in frontier.queue_counts() {
        if count > 0 {
            println!("  {}: {}", state, count);
        }
    }
    println!();

    for report in reports {
        println!(
            "{} [{}] precedence {}, {} pending, {} retries, {}/{} URIs, {} bytes",
            report.key,
            report.state,
            report.precedence,
            report.pending,
            report.retries,
            report.uris_charged,
            describe_budget(report.uri_budget),
            report.total_bytes
        );
    }

    Ok(())
}
