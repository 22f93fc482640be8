use super::{PageState, VisitedRegistry};
use crate::output::{ChunkCursor, CrawlStatistics};
use crate::url::{output_key, CanonicalUrl, Scope};

/// All mutable state of one crawl
///
/// A session is created once per crawl and threaded explicitly through the
/// coordinator and the output sink. Nothing in it is shared, so it needs no
/// synchronization.
#[derive(Debug)]
pub struct CrawlSession {
    seed: CanonicalUrl,
    scope: Scope,
    registry: VisitedRegistry,
    chunk: ChunkCursor,
    stats: CrawlStatistics,
}

impl CrawlSession {
    /// Creates a session whose scope is derived from the seed
    pub fn new(seed: CanonicalUrl) -> Self {
        let scope = Scope::from_seed(&seed);
        Self::with_scope(seed, scope)
    }

    /// Creates a session with an explicit scope
    pub fn with_scope(seed: CanonicalUrl, scope: Scope) -> Self {
        Self {
            seed,
            scope,
            registry: VisitedRegistry::new(),
            chunk: ChunkCursor::new(),
            stats: CrawlStatistics::new(),
        }
    }

    pub fn seed(&self) -> &CanonicalUrl {
        &self.seed
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Directory name under the output root for this crawl
    pub fn output_key(&self) -> String {
        output_key(&self.seed)
    }

    pub fn registry(&self) -> &VisitedRegistry {
        &self.registry
    }

    pub fn chunk(&self) -> &ChunkCursor {
        &self.chunk
    }

    pub fn chunk_mut(&mut self) -> &mut ChunkCursor {
        &mut self.chunk
    }

    pub fn stats(&self) -> &CrawlStatistics {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut CrawlStatistics {
        &mut self.stats
    }

    /// Decides whether a URL gets rendered
    ///
    /// Out-of-scope and already visited URLs are dropped (and counted);
    /// anything else is marked visited before this returns true.
    pub fn admit(&mut self, url: &CanonicalUrl) -> bool {
        if !self.scope.contains(url) {
            tracing::trace!("Skipping out-of-scope URL: {}", url);
            self.stats.record(PageState::OutOfScope);
            return false;
        }

        if !self.registry.mark_visited(url) {
            tracing::trace!("Skipping already visited URL: {}", url);
            self.stats.record(PageState::Duplicate);
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::canonicalize;

    fn session(seed: &str) -> CrawlSession {
        CrawlSession::new(canonicalize(seed).unwrap())
    }

    #[test]
    fn test_new_session() {
        let session = session("https://a.com/docs/?lang=en");
        assert_eq!(session.seed().as_str(), "https://a.com/docs/");
        assert_eq!(session.scope().prefix(), "https://a.com/docs/");
        assert_eq!(session.chunk().index(), 1);
        assert!(session.registry().is_empty());
        assert_eq!(session.output_key(), "a.com");
    }

    #[test]
    fn test_admit_marks_visited() {
        let mut session = session("https://a.com/docs/");
        let url = canonicalize("https://a.com/docs/intro").unwrap();

        assert!(session.admit(&url));
        assert!(session.registry().has_visited(&url));
        assert!(!session.admit(&url));
        assert_eq!(session.stats().count(PageState::Duplicate), 1);
    }

    #[test]
    fn test_admit_rejects_out_of_scope() {
        let mut session = session("https://a.com/docs/");
        let url = canonicalize("https://a.com/blog/post").unwrap();

        assert!(!session.admit(&url));
        assert!(!session.registry().has_visited(&url));
        assert_eq!(session.stats().count(PageState::OutOfScope), 1);
    }
}
