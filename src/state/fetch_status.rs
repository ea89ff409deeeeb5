//! Fetch outcome definitions
//!
//! The fetch transport records one of these on a candidate URI before handing
//! it back to the frontier. The frontier only cares about the coarse
//! [`Disposition`]; the finer status is kept for logging and reporting.
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the frontier must treat a completed fetch attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// The server was contacted; politeness delay and budget apply
    Success,

    /// Worth another attempt, subject to the retry ceiling
    Retryable,

    /// Terminal; the URI is dropped without delaying its queue
    Dispositive,
}

/// Outcome of one fetch attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "code", rename_all = "snake_case")]
pub enum FetchStatus {
    // ===== Completed exchanges =====
    /// The server answered with this HTTP status code (any code, 404 included)
    Http(u16),

    // ===== Retryable failures =====
    /// TCP connection could not be established
    ConnectFailed,

    /// Connection dropped mid-transfer
    ConnectLost,

    /// Transport gave up waiting (also used for URIs reaped by the watchdog)
    Timeout,

    /// A prerequisite had to be fetched first
    Deferred,

    // ===== Dispositive failures =====
    /// Host name could not be resolved
    DomainUnresolvable,

    /// robots.txt forbids the fetch
    RobotsPrecluded,

    /// Rejected by crawl scope
    OutOfScope,

    /// Rejected by an operator-supplied filter
    BlockedByUser,

    /// Too far from the seeds
    TooManyHops,

    /// Removed by an operator while queued
    DeletedByUser,

    /// Internal error while processing the URI
    RuntimeError,
}

impl FetchStatus {
    /// Classifies this status for the frontier
    pub fn disposition(&self) -> Disposition {
        match self {
            Self::Http(_) => Disposition::Success,
            Self::ConnectFailed | Self::ConnectLost | Self::Timeout | Self::Deferred => {
                Disposition::Retryable
            }
            Self::DomainUnresolvable
            | Self::RobotsPrecluded
            | Self::OutOfScope
            | Self::BlockedByUser
            | Self::TooManyHops
            | Self::DeletedByUser
            | Self::RuntimeError => Disposition::Dispositive,
        }
    }

    /// Returns true if the crawler chose not to fetch (policy exclusion)
    ///
    /// These are counted as disregarded rather than failed.
    pub fn is_disregarded(&self) -> bool {
        matches!(
            self,
            Self::RobotsPrecluded
                | Self::OutOfScope
                | Self::BlockedByUser
                | Self::TooManyHops
                | Self::DeletedByUser
        )
    }

    pub fn is_success(&self) -> bool {
        self.disposition() == Disposition::Success
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(code) => write!(f, "http_{}", code),
            Self::ConnectFailed => write!(f, "connect_failed"),
            Self::ConnectLost => write!(f, "connect_lost"),
            Self::Timeout => write!(f, "timeout"),
            Self::Deferred => write!(f, "deferred"),
            Self::DomainUnresolvable => write!(f, "domain_unresolvable"),
            Self::RobotsPrecluded => write!(f, "robots_precluded"),
            Self::OutOfScope => write!(f, "out_of_scope"),
            Self::BlockedByUser => write!(f, "blocked_by_user"),
            Self::TooManyHops => write!(f, "too_many_hops"),
            Self::DeletedByUser => write!(f, "deleted_by_user"),
            Self::RuntimeError => write!(f, "runtime_error"),
        }
    }
}
