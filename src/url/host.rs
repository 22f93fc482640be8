use super::CanonicalUrl;

/// Returns the directory name that groups output for a crawl target
///
/// The key is the lowercase host. A non-default port is appended with an
/// underscore so crawls of different local servers never share a directory
/// and the name stays valid on every filesystem.
///
/// # Examples
///
/// ```
/// use sumi_scribe::url::{canonicalize, output_key};
///
/// let url = canonicalize("https://Docs.Example.com/guide").unwrap();
/// assert_eq!(output_key(&url), "docs.example.com");
///
/// let url = canonicalize("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(output_key(&url), "127.0.0.1_8080");
/// ```
pub fn output_key(url: &CanonicalUrl) -> String {
    let url = url.as_url();
    let host = url.host_str().unwrap_or("unknown-host").to_lowercase();

    match url.port() {
        Some(port) => format!("{}_{}", host, port),
        None => host,
    }
}
