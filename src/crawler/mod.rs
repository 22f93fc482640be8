//! Crawler module for page rendering and processing
//!
//! This module contains the core crawling logic, including:
//! - Headless browser rendering with sub-resource blocking
//! - Link extraction and scope filtering
//! - Structured text extraction over an engine-neutral document tree
//! - Overall crawl coordination

mod content;
mod coordinator;
mod document;
mod links;
mod renderer;

pub use content::{
    extract_content, extract_page_text, extract_structured, PageText, CONTENT_TAGS,
    HEADING_SEPARATOR_WIDTH,
};
pub use coordinator::Coordinator;
pub use document::{DocumentNode, HtmlNode};
pub use links::extract_links;
pub use renderer::{ChromePage, ChromeRenderer, PageRenderer, RenderedPage};
