//! Crawl statistics
//!
//! Counters collected while a crawl runs, printed when it ends.

use crate::state::PageState;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Count of encountered URLs by final state
    pages_by_state: HashMap<PageState, u64>,

    /// In-scope links reported by the link extractor (before dedup)
    pub links_discovered: u64,

    /// Pages whose structured extraction fell back to raw text
    pub extraction_fallbacks: u64,

    /// Pages whose cleanup call failed and kept the original text
    pub transform_fallbacks: u64,

    /// Total bytes appended to chunks
    pub bytes_written: u64,

    /// Highest chunk index written to
    pub last_chunk: u32,

    started: Instant,
}

impl CrawlStatistics {
    pub fn new() -> Self {
        Self {
            pages_by_state: HashMap::new(),
            links_discovered: 0,
            extraction_fallbacks: 0,
            transform_fallbacks: 0,
            bytes_written: 0,
            last_chunk: 0,
            started: Instant::now(),
        }
    }

    /// Counts one URL in the given state
    pub fn record(&mut self, state: PageState) {
        *self.pages_by_state.entry(state).or_insert(0) += 1;
    }

    /// Number of URLs recorded in the given state
    pub fn count(&self, state: PageState) -> u64 {
        self.pages_by_state.get(&state).copied().unwrap_or(0)
    }

    /// Pages that were actually rendered
    pub fn pages_visited(&self) -> u64 {
        PageState::all_states()
            .iter()
            .filter(|s| s.was_visited())
            .map(|s| self.count(*s))
            .sum()
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Share of rendered pages that produced a persisted record, in percent
    pub fn success_rate(&self) -> f64 {
        let visited = self.pages_visited();
        if visited == 0 {
            return 0.0;
        }
        (self.count(PageState::Persisted) as f64 / visited as f64) * 100.0
    }
}

impl Default for CrawlStatistics {
    fn default() -> Self {
        Self::new()
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages rendered: {}", stats.pages_visited());
    println!("  In-scope links found: {}", stats.links_discovered);
    println!("  Bytes written: {}", stats.bytes_written);
    if stats.last_chunk > 0 {
        println!("  Chunks used: {}", stats.last_chunk);
    }
    println!("  Elapsed: {:.1}s", stats.elapsed().as_secs_f64());
    println!();

    println!("URLs by State:");
    for state in PageState::all_states() {
        let count = stats.count(state);
        if count > 0 {
            println!("  {}: {}", state, count);
        }
    }
    println!();

    if stats.extraction_fallbacks > 0 || stats.transform_fallbacks > 0 {
        println!("Degraded Pages:");
        println!("  Raw-text extraction fallbacks: {}", stats.extraction_fallbacks);
        println!("  Cleanup fallbacks: {}", stats.transform_fallbacks);
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} rendered pages persisted)",
        stats.success_rate(),
        stats.count(PageState::Persisted),
        stats.pages_visited()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_count() {
        let mut stats = CrawlStatistics::new();
        stats.record(PageState::Persisted);
        stats.record(PageState::Persisted);
        stats.record(PageState::Duplicate);

        assert_eq!(stats.count(PageState::Persisted), 2);
        assert_eq!(stats.count(PageState::Duplicate), 1);
        assert_eq!(stats.count(PageState::Failed), 0);
    }

    #[test]
    fn test_pages_visited_excludes_skips() {
        let mut stats = CrawlStatistics::new();
        stats.record(PageState::Persisted);
        stats.record(PageState::Failed);
        stats.record(PageState::PersistFailed);
        stats.record(PageState::OutOfScope);
        stats.record(PageState::Duplicate);

        assert_eq!(stats.pages_visited(), 3);
    }

    #[test]
    fn test_success_rate() {
        let mut stats = CrawlStatistics::new();
        for _ in 0..4 {
            stats.record(PageState::Persisted);
        }
        stats.record(PageState::Failed);

        assert!((stats.success_rate() - 80.0).abs() < 0.01);
    }

    #[test]
    fn test_success_rate_zero_pages() {
        assert_eq!(CrawlStatistics::new().success_rate(), 0.0);
    }
}
