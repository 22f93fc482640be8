/// Page state definitions for tracking what happened to each URL
use std::fmt;

/// Represents where a URL ended up during the crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageState {
    // ===== Skip States =====
    /// URL was already visited in this session
    Duplicate,

    /// URL does not start with the scope prefix
    OutOfScope,

    // ===== Terminal Success States =====
    /// Page was rendered and its record appended to a chunk
    Persisted,

    // ===== Terminal Error States =====
    /// Page was rendered but writing its record failed; the record is lost
    PersistFailed,

    /// Rendering or extraction failed; the page's subtree was skipped
    Failed,
}

impl PageState {
    /// Returns true if the page was rendered (successfully or not)
    pub fn was_visited(&self) -> bool {
        matches!(self, Self::Persisted | Self::PersistFailed | Self::Failed)
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Persisted)
    }

    /// Returns true if this represents a skip state
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Duplicate | Self::OutOfScope)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(self, Self::PersistFailed | Self::Failed)
    }

    /// Short label used in log lines and statistics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Duplicate => "duplicate",
            Self::OutOfScope => "out_of_scope",
            Self::Persisted => "persisted",
            Self::PersistFailed => "persist_failed",
            Self::Failed => "failed",
        }
    }

    /// Returns all possible page states
    pub fn all_states() -> [Self; 5] {
        [
            Self::Duplicate,
            Self::OutOfScope,
            Self::Persisted,
            Self::PersistFailed,
            Self::Failed,
        ]
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
