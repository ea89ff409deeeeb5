//! State module for the frontier's scheduling vocabulary
//!
//! # Components
//!
//! - `QueueState`: the lifecycle of a work queue (inactive, ready, in process, snoozed, ...)
//! - `FetchStatus`: what the fetch transport reports for one attempt
//! - `Disposition`: how the frontier treats that outcome (success, retry, drop)

mod fetch_status;
mod queue_state;

pub use fetch_status::{Disposition, FetchStatus};
pub use queue_state::QueueState;
