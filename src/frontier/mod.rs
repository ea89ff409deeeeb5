//! Frontier module for Ripple-Frontier
//!
//! # Components
//!
//! - `Frontier`: the controller workers call to schedule, receive and finish URIs
//! - `QueueDirectory`: every work queue, indexed by state
//! - `WorkQueue`: one scheduling key's pending URIs, budget and in-flight slot
//! - `FingerprintStore`: the persistent "already seen" set
//! - politeness and retry delay computation
//!
//! # Example
//!
//! ```no_run
//! use ripple_frontier::{CandidateUri, Config, FetchStatus, Frontier, MemoryStorage};
//! use std::time::Duration;
//!
//! # async fn run() -> ripple_frontier::Result<()> {
//! let frontier = Frontier::new(Config::default(), MemoryStorage::new())?;
//! frontier.schedule(CandidateUri::parse("https://example.com/").unwrap())?;
//!
//! while let Some(mut curi) = frontier.next().await? {
//!     // fetch it...
//!     curi.record_fetch(FetchStatus::Http(200), Duration::from_millis(350), 4096);
//!     frontier.finished(curi)?;
//! }
//! # Ok(())
//! # }
//! ```

mod controller;
mod directory;
mod fingerprint_store;
mod politeness;
mod work_queue;

pub use controller::{Frontier, FrontierStats, QueueReport};
pub use directory::QueueDirectory;
pub use fingerprint_store::FingerprintStore;
pub use politeness::{backoff_delay, politeness_delay};
pub use work_queue::{Budget, InFlight, WorkQueue};
