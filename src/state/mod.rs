//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlSession`: owns all mutable state of one crawl (scope, visited set, chunk cursor, statistics)
//! - `VisitedRegistry`: canonical URLs already claimed for rendering
//! - `PageState`: where each encountered URL ended up

mod page_state;
mod session;
mod visited;

// Re-export main types
pub use page_state::PageState;
pub use session::CrawlSession;
pub use visited::VisitedRegistry;
