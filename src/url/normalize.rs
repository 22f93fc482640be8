use crate::{UrlError, UrlResult};
use std::fmt;
use url::Url;

/// An absolute http(s) URL with its query string and fragment removed
///
/// This is the only key used for deduplication and scope checks. Two
/// canonical URLs are equal exactly when their serialized forms are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalUrl(Url);

impl CanonicalUrl {
    /// Returns the serialized form
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the underlying parsed URL
    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Canonicalizes a URL string
///
/// # Canonicalization Steps
///
/// 1. Parse as an absolute URL; reject if malformed or relative
/// 2. Reject anything that is not HTTP or HTTPS
/// 3. Reject URLs without a host
/// 4. Remove the query string
/// 5. Remove the fragment
///
/// Everything else (scheme, host case, path) is left as the URL parser
/// serializes it, so canonicalizing an already canonical URL is a no-op.
///
/// # Examples
///
/// ```
/// use sumi_scribe::url::canonicalize;
///
/// let url = canonicalize("https://example.com/docs/intro?lang=en#setup").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/docs/intro");
/// ```
pub fn canonicalize(url_str: &str) -> UrlResult<CanonicalUrl> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    canonicalize_url(url)
}

/// Canonicalizes an already parsed URL
pub fn canonicalize_url(mut url: Url) -> UrlResult<CanonicalUrl> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_query(None);
    url.set_fragment(None);

    Ok(CanonicalUrl(url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_fragment() {
        let result = canonicalize("https://example.com/page#section").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_remove_query() {
        let result = canonicalize("https://example.com/page?utm_source=twitter&a=1").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_remove_query_and_fragment() {
        let result = canonicalize("https://example.com/docs/?q=1#top").unwrap();
        assert_eq!(result.as_str(), "https://example.com/docs/");
    }

    #[test]
    fn test_empty_query_marker_removed() {
        let result = canonicalize("https://example.com/page?").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_keeps_trailing_slash() {
        let result = canonicalize("https://example.com/docs/").unwrap();
        assert_eq!(result.as_str(), "https://example.com/docs/");
    }

    #[test]
    fn test_empty_path_becomes_root() {
        let result = canonicalize("https://example.com").unwrap();
        assert_eq!(result.as_str(), "https://example.com/");
    }

    #[test]
    fn test_lowercase_host() {
        let result = canonicalize("https://EXAMPLE.COM/Page").unwrap();
        assert_eq!(result.as_str(), "https://example.com/Page");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "https://example.com/a/../b/?x=1#frag",
            "http://Example.com:8080/docs?",
            "https://example.com/%7Euser/page#",
            "https://example.com",
        ];

        for input in inputs {
            let once = canonicalize(input).unwrap();
            let twice = canonicalize(once.as_str()).unwrap();
            assert_eq!(once, twice, "canonicalization not idempotent for {}", input);
            assert!(twice.as_url().query().is_none());
            assert!(twice.as_url().fragment().is_none());
        }
    }

    #[test]
    fn test_invalid_scheme() {
        let result = canonicalize("ftp://example.com/page");
        assert!(matches!(result.unwrap_err(), UrlError::InvalidScheme(_)));
    }

    #[test]
    fn test_javascript_scheme_rejected() {
        assert!(canonicalize("javascript:void(0)").is_err());
    }

    #[test]
    fn test_malformed_url() {
        assert!(matches!(
            canonicalize("not a url").unwrap_err(),
            UrlError::Parse(_)
        ));
    }

    #[test]
    fn test_relative_url_rejected() {
        assert!(canonicalize("/docs/intro").is_err());
    }

    #[test]
    fn test_display_matches_as_str() {
        let url = canonicalize("https://example.com/page?x=1").unwrap();
        assert_eq!(url.to_string(), url.as_str());
    }
}
