//! Outbound link extraction
//!
//! Turns the `href` values collected from a rendered page into the ordered,
//! de-duplicated list of in-scope canonical URLs to descend into. The global
//! visited set is not consulted here; the coordinator checks it when it
//! reaches each link.

use crate::url::{canonicalize_url, CanonicalUrl, Scope};
use std::collections::HashSet;
use url::Url;

/// Resolves, canonicalizes and scope-filters a page's links
///
/// # Arguments
///
/// * `hrefs` - Raw `href` values in document order
/// * `base_url` - URL the page was rendered from, for relative links
/// * `scope` - The crawl scope
///
/// # Returns
///
/// In-scope canonical URLs in first-discovery order, each at most once
pub fn extract_links<S: AsRef<str>>(hrefs: &[S], base_url: &Url, scope: &Scope) -> Vec<CanonicalUrl> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for href in hrefs {
        let Some(absolute) = resolve_link(href.as_ref(), base_url) else {
            continue;
        };

        let canonical = match canonicalize_url(absolute) {
            Ok(c) => c,
            Err(e) => {
                tracing::trace!("Dropping link {}: {}", href.as_ref(), e);
                continue;
            }
        };

        if !scope.contains(&canonical) {
            continue;
        }

        if seen.insert(canonical.clone()) {
            links.push(canonical);
        }
    }

    links
}

/// Resolves an href to an absolute http(s) URL
///
/// Returns None for empty hrefs, `javascript:`, `mailto:`, `tel:` and
/// `data:` links, same-page fragments, and anything that does not resolve.
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    match absolute.scheme() {
        "http" | "https" => Some(absolute),
        _ => None,
    }
}
