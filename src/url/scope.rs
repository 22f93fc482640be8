//! Crawl scope: the prefix every visited or followed URL must start with

use super::CanonicalUrl;

/// The boundary of a crawl
///
/// The prefix is the canonical seed URL with a trailing slash. A URL is in
/// scope when its canonical form starts with the prefix, or when it is the
/// prefix itself without the trailing slash (so the seed `https://a.com/docs`
/// is in the scope `https://a.com/docs/`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    prefix: String,
}

impl Scope {
    /// Builds the scope from the canonical seed URL
    pub fn from_seed(seed: &CanonicalUrl) -> Self {
        Self::new(seed.as_str())
    }

    /// Builds a scope from an explicit prefix, normalizing the trailing slash
    pub fn new(prefix: &str) -> Self {
        let mut prefix = prefix.trim().to_string();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        Self { prefix }
    }

    /// Returns the normalized prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns true if the URL may be visited or followed
    pub fn contains(&self, url: &CanonicalUrl) -> bool {
        let url = url.as_str();
        url.starts_with(&self.prefix) || url == self.prefix.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::canonicalize;

    fn url(s: &str) -> CanonicalUrl {
        canonicalize(s).unwrap()
    }

    #[test]
    fn test_prefix_gets_trailing_slash() {
        assert_eq!(Scope::new("https://a.com/docs").prefix(), "https://a.com/docs/");
        assert_eq!(Scope::new("https://a.com/docs/").prefix(), "https://a.com/docs/");
    }

    #[test]
    fn test_contains_children() {
        let scope = Scope::new("https://a.com/docs/");
        assert!(scope.contains(&url("https://a.com/docs/")));
        assert!(scope.contains(&url("https://a.com/docs/intro")));
        assert!(scope.contains(&url("https://a.com/docs/guide/setup?x=1")));
    }

    #[test]
    fn test_seed_without_slash_in_scope() {
        let seed = url("https://a.com/docs");
        let scope = Scope::from_seed(&seed);
        assert!(scope.contains(&seed));
        assert!(scope.contains(&url("https://a.com/docs/intro")));
    }

    #[test]
    fn test_excludes_siblings_and_other_hosts() {
        let scope = Scope::new("https://a.com/docs/");
        assert!(!scope.contains(&url("https://a.com/blog/post")));
        assert!(!scope.contains(&url("https://a.com/docs-old/page")));
        assert!(!scope.contains(&url("https://b.com/docs/intro")));
        assert!(!scope.contains(&url("http://a.com/docs/intro")));
        assert!(!scope.contains(&url("https://a.com/")));
    }

    #[test]
    fn test_root_scope_covers_whole_host() {
        let scope = Scope::from_seed(&url("https://a.com"));
        assert_eq!(scope.prefix(), "https://a.com/");
        assert!(scope.contains(&url("https://a.com/anything/at/all")));
        assert!(!scope.contains(&url("https://a.com.evil.org/")));
    }
}
