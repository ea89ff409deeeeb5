use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use ripple_frontier::uri::extract_host;
///
/// let url = Url::parse("https://Blog.Example.COM/path").unwrap();
/// assert_eq!(extract_host(&url), Some("blog.example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Derives the default scheduling key for a URL
///
/// URIs are grouped per host; a non-default port gets its own queue
/// (`host#port`), since it is usually a different server.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use ripple_frontier::uri::scheduling_key_for;
///
/// let url = Url::parse("https://example.com/a").unwrap();
/// assert_eq!(scheduling_key_for(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://example.com:8080/a").unwrap();
/// assert_eq!(scheduling_key_for(&url), Some("example.com#8080".to_string()));
/// ```
pub fn scheduling_key_for(url: &Url) -> Option<String> {
    let host = extract_host(url)?;
    Some(match url.port() {
        Some(port) => format!("{}#{}", host, port),
        None => host,
    })
}

/// Checks if a host matches a site pattern
///
/// `"example.com"` matches only itself; `"*.example.com"` also matches the bare
/// domain and any subdomain at any depth.
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(base) => {
            candidate == base
                || candidate
                    .strip_suffix(base)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        }
        None => candidate == pattern,
    }
}
