//! URI handling module for Ripple-Frontier
//!
//! This module provides the candidate URI type, scheduling-key derivation,
//! canonicalization and fingerprinting used for duplicate detection, and
//! site-pattern matching for per-site overrides.

mod candidate;
mod domain;
mod fingerprint;
mod normalize;

pub use candidate::{
    CandidateUri, DEFAULT_PRECEDENCE, HOP_EMBED, HOP_LINK, HOP_PREREQUISITE,
};
pub use domain::{extract_host, matches_wildcard, scheduling_key_for};
pub use fingerprint::Fingerprint;
pub use normalize::canonicalize;

use crate::config::CanonicalizationConfig;

/// Computes the fingerprint of a candidate URI under the given canonicalization rules
pub fn fingerprint_of(curi: &CandidateUri, rules: &CanonicalizationConfig) -> Fingerprint {
    Fingerprint::of(&canonicalize(curi.url(), rules))
}
