//! Optional content cleanup step
//!
//! Extracted page text can be handed to an external service that strips
//! boilerplate while keeping titles, subtitles, and code. The step is a
//! pluggable [`ContentTransformer`]; [`IdentityTransformer`] is used when no
//! service is configured.
//!
//! ```text
//! extracted text → ContentTransformer → cleaned text
//!                        │ (any failure)
//!                        └──────────────→ extracted text, unchanged
//! ```

mod codegpt;

pub use codegpt::{CodeGptTransformer, CLEANUP_INSTRUCTION};

use crate::url::CanonicalUrl;
use async_trait::async_trait;
use thiserror::Error;

/// Errors from a cleanup service call
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Cleanup service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Cleanup service request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Malformed cleanup response: {0}")]
    Malformed(String),

    #[error("Cleanup service returned no text")]
    Empty,
}

/// Trait for content cleanup implementations
#[async_trait]
pub trait ContentTransformer: Send + Sync {
    /// Short name used in log lines
    fn name(&self) -> &str;

    /// Returns the cleaned text for a page
    async fn transform(&self, url: &CanonicalUrl, text: &str) -> Result<String, TransformError>;
}

/// Pass-through transformer used when no cleanup service is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransformer;

#[async_trait]
impl ContentTransformer for IdentityTransformer {
    fn name(&self) -> &str {
        "identity"
    }

    async fn transform(&self, _url: &CanonicalUrl, text: &str) -> Result<String, TransformError> {
        Ok(text.to_string())
    }
}

/// Result of running the cleanup step on one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    pub text: String,

    /// True when the service failed and the original text was kept
    pub fell_back: bool,
}

/// Runs the cleanup step, keeping the original text on any failure
///
/// Failures are logged and never propagated.
pub async fn apply_transform(
    transformer: &dyn ContentTransformer,
    url: &CanonicalUrl,
    text: String,
) -> Transformed {
    match transformer.transform(url, &text).await {
        Ok(cleaned) => Transformed {
            text: cleaned,
            fell_back: false,
        },
        Err(e) => {
            tracing::warn!(
                "Cleanup via {} failed for {}, keeping extracted text: {}",
                transformer.name(),
                url,
                e
            );
            Transformed {
                text,
                fell_back: true,
            }
        }
    }
}
