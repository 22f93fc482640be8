//! Structured text extraction from rendered documents
//!
//! The document is walked in pre-order and only text that sits directly in a
//! content-bearing element is kept:
//!
//! - text whose parent is one of [`CONTENT_TAGS`] is appended, one line each
//! - `pre` and `code` elements append their full text and a blank line
//! - headings are preceded by a separator of [`HEADING_SEPARATOR_WIDTH`] dashes
//!
//! Script, style, noscript and iframe subtrees are skipped entirely. When the
//! structured walk cannot finish within its deadline, the page's rendered
//! body text is used instead.

use super::document::{DocumentNode, HtmlNode};
use super::renderer::RenderedPage;
use crate::{Result, ScribeError};
use scraper::Html;
use std::time::Duration;

/// Width of the dash line inserted before every heading
pub const HEADING_SEPARATOR_WIDTH: usize = 50;

/// Elements whose direct text is kept
pub const CONTENT_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "pre", "code", "table", "tr",
    "td", "th",
];

const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "iframe"];

fn is_heading(tag: &str) -> bool {
    matches!(tag, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

fn is_preformatted(tag: &str) -> bool {
    matches!(tag, "pre" | "code")
}

/// Text produced for one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub text: String,

    /// True when the raw rendered text replaced the structured extraction
    pub fell_back: bool,
}

/// Walks a document tree and assembles its structured text
pub fn extract_structured<N: DocumentNode>(root: N) -> String {
    let mut out = String::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if let Some(tag) = node.tag_name() {
            let tag = tag.to_ascii_lowercase();
            if SKIPPED_TAGS.contains(&tag.as_str()) {
                continue;
            }

            if is_heading(&tag) {
                out.push_str(&"-".repeat(HEADING_SEPARATOR_WIDTH));
                out.push('\n');
            }

            if is_preformatted(&tag) {
                out.push_str(&node.text_content());
                out.push_str("\n\n");
            }
        } else if let Some(text) = node.text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                let in_content = node
                    .parent_tag()
                    .is_some_and(|t| CONTENT_TAGS.contains(&t.as_str()));
                if in_content {
                    out.push_str(trimmed);
                    out.push('\n');
                }
            }
        }

        // Reversed so the first child is popped next
        stack.extend(node.children().into_iter().rev());
    }

    out.trim().to_string()
}

/// Parses serialized HTML and extracts its structured text
pub fn extract_content(html: &str) -> String {
    let document = Html::parse_document(html);
    extract_structured(HtmlNode::root(&document))
}

/// Extracts a rendered page's text within `deadline`
///
/// Falls back to the page's raw rendered text when the structured pass times
/// out or fails. Only a failure to read the raw text is returned as an error.
pub async fn extract_page_text(page: &dyn RenderedPage, deadline: Duration) -> Result<PageText> {
    let structured = tokio::time::timeout(deadline, async {
        let html = page.document_html().await?;
        tokio::task::spawn_blocking(move || extract_content(&html))
            .await
            .map_err(|e| ScribeError::Extraction(e.to_string()))
    })
    .await;

    match structured {
        Ok(Ok(text)) => {
            return Ok(PageText {
                text,
                fell_back: false,
            })
        }
        Ok(Err(e)) => {
            tracing::warn!(
                "Structured extraction failed for {}, using raw text: {}",
                page.url(),
                e
            );
        }
        Err(_) => {
            tracing::warn!(
                "Structured extraction for {} exceeded {}ms, using raw text",
                page.url(),
                deadline.as_millis()
            );
        }
    }

    let text = page.raw_text().await?;
    Ok(PageText {
        text: text.trim().to_string(),
        fell_back: true,
    })
}
