use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Bits of the key taken from the scheme+host+port hash
const AUTHORITY_BITS: u32 = 24;

/// Bits of the key taken from the full-URI hash
const URI_BITS: u32 = 64 - AUTHORITY_BITS;

const SCHEME_SEPARATOR: &str = "://";

/// A 64-bit URI fingerprint
///
/// The top 24 bits hash the authority (`scheme://host:port`) and the low 40
/// bits hash the whole canonical URI. Sorting by fingerprint therefore keeps
/// every URI of a host in one contiguous run of the backing store, which is
/// what keeps lookups cheap at hundreds of millions of entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Computes the fingerprint of a canonical URI string
    ///
    /// # Examples
    ///
    /// ```
    /// use ripple_frontier::uri::Fingerprint;
    ///
    /// let a = Fingerprint::of("https://example.com/a");
    /// let b = Fingerprint::of("https://example.com/b");
    /// assert_ne!(a, b);
    /// assert_eq!(a.authority_bits(), b.authority_bits());
    /// ```
    pub fn of(canonical_uri: &str) -> Self {
        let authority = authority_of(canonical_uri);
        let high = hash_bits(authority, AUTHORITY_BITS) << URI_BITS;
        let low = hash_bits(canonical_uri, URI_BITS);
        Self(high | low)
    }

    pub fn from_u64(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// The host-derived prefix shared by every URI of one authority
    pub fn authority_bits(&self) -> u32 {
        (self.0 >> URI_BITS) as u32
    }

    pub fn to_be_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    pub fn from_be_bytes(bytes: [u8; 8]) -> Self {
        Self(u64::from_be_bytes(bytes))
    }

    /// Maps the fingerprint onto a signed integer with the same ordering
    ///
    /// SQLite integers are signed; flipping the top bit keeps unsigned order.
    pub fn to_sql_key(&self) -> i64 {
        (self.0 ^ (1 << 63)) as i64
    }

    pub fn from_sql_key(key: i64) -> Self {
        Self((key as u64) ^ (1 << 63))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Returns `scheme://host[:port]`, or the whole string if it has no path
fn authority_of(uri: &str) -> &str {
    let Some(scheme_end) = uri.find(SCHEME_SEPARATOR) else {
        return uri;
    };
    let host_start = scheme_end + SCHEME_SEPARATOR.len();
    match uri[host_start..].find('/') {
        Some(offset) => &uri[..host_start + offset],
        None => uri,
    }
}

/// The top `bits` bits of the SHA-256 digest, right-aligned
fn hash_bits(input: &str, bits: u32) -> u64 {
    let digest = Sha256::digest(input.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix) >> (64 - bits)
}
