//! Extracted page records and their on-disk text format

use crate::url::CanonicalUrl;
use chrono::{DateTime, SecondsFormat, Utc};

/// Width of the `=` line closing every record
pub const RECORD_SEPARATOR_WIDTH: usize = 80;

/// The text harvested from one page, ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRecord {
    url: CanonicalUrl,
    content: String,
    timestamp: String,
}

impl ExtractedRecord {
    /// Builds a record stamped with the current time
    pub fn new(url: CanonicalUrl, content: String) -> Self {
        Self::with_timestamp(url, content, Utc::now())
    }

    /// Builds a record with an explicit timestamp
    pub fn with_timestamp(url: CanonicalUrl, content: String, at: DateTime<Utc>) -> Self {
        Self {
            url,
            content,
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn url(&self) -> &CanonicalUrl {
        &self.url
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// ISO-8601 timestamp, UTC
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Renders the record the way it is stored in a chunk
    ///
    /// ```text
    /// URL: <canonical url>
    /// Timestamp: <ISO-8601>
    ///
    /// <content>
    ///
    /// ================================================================================
    /// ```
    ///
    /// followed by a blank line so consecutive records stay visually apart.
    pub fn format(&self) -> String {
        format!(
            "URL: {}\nTimestamp: {}\n\n{}\n\n{}\n\n",
            self.url,
            self.timestamp,
            self.content,
            "=".repeat(RECORD_SEPARATOR_WIDTH)
        )
    }
}
