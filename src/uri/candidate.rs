use crate::state::FetchStatus;
use crate::uri::domain::{extract_host, scheduling_key_for};
use crate::{UriError, UriResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Hop type recorded in `path_from_seed` for an ordinary link
pub const HOP_LINK: char = 'L';

/// Hop type for an embedded resource (image, script, ...)
pub const HOP_EMBED: char = 'E';

/// Hop type for a prerequisite (robots.txt, DNS lookup) of another URI
pub const HOP_PREREQUISITE: char = 'P';

/// Default precedence for newly discovered URIs (lower dispatches first)
pub const DEFAULT_PRECEDENCE: u8 = 10;

/// A discovered URI plus everything the frontier needs to schedule it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateUri {
    url: Url,

    /// Queue this URI belongs to (normally its host)
    scheduling_key: String,

    /// Set when the key was chosen explicitly; site rules will not override it
    #[serde(default)]
    key_pinned: bool,

    /// Precedence class (lower values dispatch first)
    pub precedence: u8,

    /// Must precede the URIs already queued for its site
    #[serde(default)]
    pub prerequisite: bool,

    /// Bypass duplicate detection
    #[serde(default)]
    pub force_fetch: bool,

    /// One hop character per link followed from the seed
    #[serde(default)]
    pub path_from_seed: String,

    /// The URI this one was discovered on
    #[serde(default)]
    pub via: Option<String>,

    /// Number of completed fetch attempts
    #[serde(default)]
    pub fetch_attempts: u32,

    /// Outcome of the last attempt, recorded by the fetch transport
    #[serde(default)]
    pub fetch_status: Option<FetchStatus>,

    /// Duration of the last attempt in milliseconds
    #[serde(default)]
    pub fetch_duration_ms: Option<u64>,

    /// Bytes transferred by the last attempt
    #[serde(default)]
    pub content_size: u64,

    /// Minimum politeness delay this URI demands (e.g. a robots crawl-delay)
    #[serde(default)]
    pub min_delay_override_ms: Option<u64>,

    /// Token identifying the dispatch this copy was handed out by
    #[serde(default)]
    pub(crate) dispatch_id: Option<u64>,
}

impl CandidateUri {
    /// Parses a URI string into a seed candidate
    ///
    /// # Examples
    ///
    /// ```
    /// use ripple_frontier::CandidateUri;
    ///
    /// let curi = CandidateUri::parse("https://Example.com/start").unwrap();
    /// assert_eq!(curi.scheduling_key(), "example.com");
    /// assert_eq!(curi.hop_count(), 0);
    /// ```
    pub fn parse(uri: &str) -> UriResult<Self> {
        let url = Url::parse(uri).map_err(|e| UriError::Parse(e.to_string()))?;
        Self::from_url(url)
    }

    /// Builds a seed candidate from an already parsed URL
    pub fn from_url(url: Url) -> UriResult<Self> {
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UriError::InvalidScheme(url.scheme().to_string()));
        }

        let scheduling_key = scheduling_key_for(&url).ok_or(UriError::MissingHost)?;

        Ok(Self {
            url,
            scheduling_key,
            key_pinned: false,
            precedence: DEFAULT_PRECEDENCE,
            prerequisite: false,
            force_fetch: false,
            path_from_seed: String::new(),
            via: None,
            fetch_attempts: 0,
            fetch_status: None,
            fetch_duration_ms: None,
            content_size: 0,
            min_delay_override_ms: None,
            dispatch_id: None,
        })
    }

    /// Creates a candidate discovered on `parent` by following a hop of the given type
    ///
    /// A prerequisite hop marks the new candidate as a prerequisite, placing it
    /// ahead of everything already queued for its site.
    pub fn discovered(uri: &str, parent: &CandidateUri, hop: char) -> UriResult<Self> {
        let mut curi = Self::parse(uri)?;
        curi.path_from_seed = format!("{}{}", parent.path_from_seed, hop);
        curi.via = Some(parent.url.to_string());
        curi.prerequisite = hop == HOP_PREREQUISITE;
        Ok(curi)
    }

    /// Overrides the scheduling key
    pub fn with_scheduling_key(mut self, key: impl Into<String>) -> Self {
        self.scheduling_key = key.into();
        self.key_pinned = true;
        self
    }

    pub fn with_precedence(mut self, precedence: u8) -> Self {
        self.precedence = precedence;
        self
    }

    pub fn as_prerequisite(mut self) -> Self {
        self.prerequisite = true;
        self
    }

    pub fn forced(mut self) -> Self {
        self.force_fetch = true;
        self
    }

    pub fn with_min_delay(mut self, delay: Duration) -> Self {
        self.min_delay_override_ms = Some(delay.as_millis() as u64);
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn host(&self) -> Option<String> {
        extract_host(&self.url)
    }

    pub fn scheduling_key(&self) -> &str {
        &self.scheduling_key
    }

    pub fn is_key_pinned(&self) -> bool {
        self.key_pinned
    }

    /// Replaces the scheduling key chosen by site rules
    pub(crate) fn assign_scheduling_key(&mut self, key: String) {
        self.scheduling_key = key;
    }

    pub fn hop_count(&self) -> usize {
        self.path_from_seed.chars().count()
    }

    /// Records the outcome of a fetch attempt
    ///
    /// Called by the fetch transport before the URI is handed back to
    /// `Frontier::finished`.
    pub fn record_fetch(&mut self, status: FetchStatus, duration: Duration, bytes: u64) {
        self.fetch_status = Some(status);
        self.fetch_duration_ms = Some(duration.as_millis() as u64);
        self.content_size = bytes;
    }

    pub fn fetch_duration(&self) -> Duration {
        Duration::from_millis(self.fetch_duration_ms.unwrap_or(0))
    }

    pub fn min_delay_override(&self) -> Option<Duration> {
        self.min_delay_override_ms.map(Duration::from_millis)
    }

    /// Drops the per-attempt outcome before the URI goes back into a queue
    pub(crate) fn clear_fetch_outcome(&mut self) {
        self.fetch_status = None;
        self.fetch_duration_ms = None;
        self.content_size = 0;
        self.dispatch_id = None;
    }

    /// Returns true if `other` is the same dispatch of the same URI
    pub(crate) fn same_dispatch(&self, other: &CandidateUri) -> bool {
        self.url == other.url && self.dispatch_id == other.dispatch_id
    }
}
