//! URL handling module for Sumi-Scribe
//!
//! This module provides URL canonicalization, the crawl scope check, and
//! host extraction for output grouping.

mod host;
mod normalize;
mod scope;

pub use host::output_key;
pub use normalize::{canonicalize, canonicalize_url, CanonicalUrl};
pub use scope::Scope;
