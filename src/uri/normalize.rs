use crate::config::CanonicalizationConfig;
use url::Url;

/// Click-tracking parameters added by ad and mail platforms
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid", "msclkid"];

/// Session identifiers issued by common application servers, matched case-insensitively
const SESSION_PARAMS: &[&str] = &["jsessionid", "phpsessid", "sid", "cfid", "cftoken"];

/// Produces the canonical form of a URL used for duplicate detection
///
/// The candidate URI keeps its original form; only the fingerprint is computed
/// from this string, so two spellings of the same resource collapse to one
/// entry in the fingerprint store.
///
/// # Canonicalization Steps
///
/// 1. Lowercase the host (the `url` crate already does this for http/https,
///    drops default ports and resolves `.`/`..` segments)
/// 2. Optionally strip a leading `www.`
/// 3. Drop the fragment
/// 4. Optionally drop tracking and session-id parameters (`utm_*`, `fbclid`,
///    `jsessionid`, `PHPSESSID`, `ASPSESSIONID*`, ...), including a
///    `;jsessionid=` path parameter
/// 5. Drop an empty query; the remaining parameters keep their order
///
/// # Examples
///
/// ```
/// use url::Url;
/// use ripple_frontier::config::CanonicalizationConfig;
/// use ripple_frontier::uri::canonicalize;
///
/// let url = Url::parse("http://WWW.Example.com/a?b=2&utm_source=x&a=1#top").unwrap();
/// let canonical = canonicalize(&url, &CanonicalizationConfig::default());
/// assert_eq!(canonical, "http://example.com/a?b=2&a=1");
/// ```
pub fn canonicalize(url: &Url, rules: &CanonicalizationConfig) -> String {
    let mut url = url.clone();

    if rules.strip_www {
        if let Some(host) = url.host_str() {
            if let Some(stripped) = host.to_lowercase().strip_prefix("www.") {
                let stripped = stripped.to_string();
                // Only fails for cannot-be-a-base URLs, which have no host to strip
                let _ = url.set_host(Some(&stripped));
            }
        }
    }

    url.set_fragment(None);

    if rules.strip_tracking_params {
        strip_path_session_id(&mut url);
    }

    if url.query().is_some() {
        let params = filter_query_params(&url, rules.strip_tracking_params);

        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut()
                .clear()
                .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
    }

    url.into()
}

/// Filters out tracking and session parameters, keeping the original order
fn filter_query_params(url: &Url, strip_tracking: bool) -> Vec<(String, String)> {
    url.query_pairs()
        .filter(|(key, _)| !(strip_tracking && is_ignorable_param(key)))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Checks if a query parameter carries tracking or session state only
fn is_ignorable_param(key: &str) -> bool {
    if key.starts_with("utm_") || TRACKING_PARAMS.contains(&key) {
        return true;
    }
    let key = key.to_ascii_lowercase();
    key.starts_with("aspsessionid") || SESSION_PARAMS.contains(&key.as_str())
}

/// Removes a servlet-style `;jsessionid=...` suffix from the last path segment
fn strip_path_session_id(url: &mut Url) {
    let path = url.path();
    let Some(start) = path.to_ascii_lowercase().find(";jsessionid=") else {
        return;
    };
    let end = path[start + 1..]
        .find(|c: char| c == '/' || c == ';')
        .map_or(path.len(), |offset| start + 1 + offset);
    let stripped = format!("{}{}", &path[..start], &path[end..]);
    url.set_path(&stripped);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canon(url: &str) -> String {
        canonicalize(&Url::parse(url).unwrap(), &CanonicalizationConfig::default())
    }

    #[test]
    fn test_fragment_dropped() {
        assert_eq!(canon("https://example.com/page#section"), "https://example.com/page");
    }

    #[test]
    fn test_www_stripped() {
        assert_eq!(canon("https://www.example.com/"), "https://example.com/");
    }

    #[test]
    fn test_www_kept_when_disabled() {
        let rules = CanonicalizationConfig {
            strip_www: false,
            strip_tracking_params: true,
        };
        let url = Url::parse("https://www.example.com/").unwrap();
        assert_eq!(canonicalize(&url, &rules), "https://www.example.com/");
    }

    #[test]
    fn test_host_case_and_default_port() {
        assert_eq!(canon("HTTPS://EXAMPLE.COM:443/Path"), "https://example.com/Path");
    }

    #[test]
    fn test_scheme_is_preserved() {
        assert_eq!(canon("http://example.com/"), "http://example.com/");
    }

    #[test]
    fn test_tracking_params_removed() {
        assert_eq!(
            canon("https://example.com/p?keep=1&utm_medium=email&fbclid=2"),
            "https://example.com/p?keep=1"
        );
        assert_eq!(canon("https://example.com/p?utm_custom=x"), "https://example.com/p");
    }

    #[test]
    fn test_tracking_params_kept_when_disabled() {
        let rules = CanonicalizationConfig {
            strip_www: true,
            strip_tracking_params: false,
        };
        let url = Url::parse("https://example.com/p?utm_source=x").unwrap();
        assert_eq!(canonicalize(&url, &rules), "https://example.com/p?utm_source=x");
    }

    #[test]
    fn test_query_order_preserved() {
        assert_eq!(canon("https://example.com/p?b=2&a=1"), "https://example.com/p?b=2&a=1");
        assert_ne!(
            canon("https://example.com/p?b=2&a=1"),
            canon("https://example.com/p?a=1&b=2")
        );
    }

    #[test]
    fn test_resource_selecting_params_kept() {
        assert_eq!(
            canon("https://github.com/o/r/blob/x.rs?ref=main"),
            "https://github.com/o/r/blob/x.rs?ref=main"
        );
        assert_ne!(
            canon("https://example.com/feed?source=rss"),
            canon("https://example.com/feed?source=atom")
        );
    }

    #[test]
    fn test_session_ids_removed() {
        assert_eq!(
            canon("https://example.com/cart?PHPSESSID=abc&item=4"),
            "https://example.com/cart?item=4"
        );
        assert_eq!(
            canon("https://example.com/a?ASPSESSIONIDQSCQTRRA=x&sid=9&cfid=1&cftoken=2"),
            "https://example.com/a"
        );
        assert_eq!(
            canon("https://example.com/shop/list.do;jsessionid=0A1B2C?page=2"),
            "https://example.com/shop/list.do?page=2"
        );
    }

    #[test]
    fn test_dot_segments_resolved() {
        assert_eq!(canon("https://example.com/a/../b/./c"), "https://example.com/b/c");
    }

    #[test]
    fn test_spellings_collapse() {
        assert_eq!(
            canon("https://WWW.example.com/x?b=1&utm_medium=feed&a=2#frag"),
            canon("https://example.com/x?b=1&a=2")
        );
    }
}
