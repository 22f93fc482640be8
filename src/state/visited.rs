use crate::url::CanonicalUrl;
use std::collections::HashSet;

/// Set of canonical URLs already claimed for rendering in this session
///
/// Marking happens before a page is rendered, so a URL that fails to render
/// is still never tried again.
#[derive(Debug, Default)]
pub struct VisitedRegistry {
    visited: HashSet<CanonicalUrl>,
}

impl VisitedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_visited(&self, url: &CanonicalUrl) -> bool {
        self.visited.contains(url)
    }

    /// Marks a URL as visited
    ///
    /// Returns true if the URL was not visited before.
    pub fn mark_visited(&mut self, url: &CanonicalUrl) -> bool {
        if self.visited.contains(url) {
            return false;
        }
        self.visited.insert(url.clone())
    }

    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }
}
