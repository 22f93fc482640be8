//! Crawl coordinator - main traversal logic
//!
//! Visits the seed, then descends depth-first into every in-scope link it
//! discovers, one page at a time. The frontier is an explicit stack of
//! per-page link iterators, so pages are visited in the same order a
//! recursive walk would produce without growing the call stack.
//!
//! Per page:
//! 1. Render (fresh browser context)
//! 2. Extract links and structured text
//! 3. Run the cleanup step
//! 4. Append the record to the current chunk
//! 5. Release the page

use crate::config::{Config, CrawlerConfig};
use crate::crawler::content::extract_page_text;
use crate::crawler::links::extract_links;
use crate::crawler::renderer::{PageRenderer, RenderedPage};
use crate::output::{persist_record, ChunkedSink, ExtractedRecord};
use crate::state::{CrawlSession, PageState};
use crate::transform::{apply_transform, ContentTransformer, IdentityTransformer};
use crate::url::CanonicalUrl;
use crate::{Result, ScribeError};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

/// Main crawler coordinator structure
pub struct Coordinator {
    renderer: Arc<dyn PageRenderer>,
    transformer: Arc<dyn ContentTransformer>,
    sink: Box<dyn ChunkedSink>,
    pacing: CrawlerConfig,
    extraction_timeout: Duration,
}

impl Coordinator {
    /// Creates a coordinator with default pacing and no cleanup step
    ///
    /// # Arguments
    ///
    /// * `renderer` - Produces rendered pages
    /// * `sink` - Receives formatted records
    pub fn new(renderer: Arc<dyn PageRenderer>, sink: Box<dyn ChunkedSink>) -> Self {
        Self {
            renderer,
            transformer: Arc::new(IdentityTransformer),
            sink,
            pacing: CrawlerConfig::default(),
            extraction_timeout: Duration::from_secs(30),
        }
    }

    /// Creates a coordinator using the pacing and deadlines from `config`
    pub fn from_config(
        config: &Config,
        renderer: Arc<dyn PageRenderer>,
        sink: Box<dyn ChunkedSink>,
    ) -> Self {
        Self::new(renderer, sink)
            .with_pacing(config.crawler.clone())
            .with_extraction_timeout(config.renderer.extraction_timeout())
    }

    pub fn with_transformer(mut self, transformer: Arc<dyn ContentTransformer>) -> Self {
        self.transformer = transformer;
        self
    }

    pub fn with_pacing(mut self, pacing: CrawlerConfig) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_extraction_timeout(mut self, timeout: Duration) -> Self {
        self.extraction_timeout = timeout;
        self
    }

    /// Runs the crawl to completion
    ///
    /// A failure on the seed page aborts the crawl and is returned. Failures
    /// on any other page are logged and traversal continues with the next
    /// sibling link.
    pub async fn run(&self, session: &mut CrawlSession) -> Result<()> {
        let seed = session.seed().clone();
        tracing::info!("Starting crawl of {} (scope {})", seed, session.scope().prefix());

        if !session.admit(&seed) {
            return Err(ScribeError::SeedOutOfScope {
                url: seed.to_string(),
            });
        }

        let seed_links = match self.visit_page(session, &seed).await {
            Ok(links) => links,
            Err(e) => {
                session.stats_mut().record(PageState::Failed);
                tracing::error!("Seed page {} failed: {}", seed, e);
                return Err(e);
            }
        };

        let mut frontier: Vec<std::vec::IntoIter<CanonicalUrl>> = vec![seed_links.into_iter()];
        let mut pages_rendered: u64 = 1;

        loop {
            let next = match frontier.last_mut() {
                Some(top) => top.next(),
                None => break,
            };

            let Some(url) = next else {
                frontier.pop();
                continue;
            };

            if !session.admit(&url) {
                continue;
            }

            self.pause().await;
            pages_rendered += 1;

            match self.visit_page(session, &url).await {
                Ok(links) => frontier.push(links.into_iter()),
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", url, e);
                    session.stats_mut().record(PageState::Failed);
                }
            }

            if pages_rendered % 10 == 0 {
                tracing::info!(
                    "Progress: {} pages rendered, {} visited, depth {}",
                    pages_rendered,
                    session.registry().len(),
                    frontier.len()
                );
            }
        }

        tracing::info!(
            "Crawl complete: {} pages rendered, {} records persisted",
            pages_rendered,
            session.stats().count(PageState::Persisted)
        );
        Ok(())
    }

    /// Renders one page, processes it and always releases it
    ///
    /// Returns the page's in-scope links. Persistence failures are recorded
    /// and do not fail the visit.
    async fn visit_page(
        &self,
        session: &mut CrawlSession,
        url: &CanonicalUrl,
    ) -> Result<Vec<CanonicalUrl>> {
        tracing::info!("Visiting {}", url);

        let mut page = self.renderer.render(url).await?;
        let outcome = self.process_page(session, page.as_ref()).await;

        if let Err(e) = page.close().await {
            tracing::warn!("Failed to release page {}: {}", url, e);
        }

        outcome
    }

    async fn process_page(
        &self,
        session: &mut CrawlSession,
        page: &dyn RenderedPage,
    ) -> Result<Vec<CanonicalUrl>> {
        let url = page.url().clone();

        let hrefs = page.anchor_hrefs().await?;
        let links = extract_links(&hrefs, url.as_url(), session.scope());
        tracing::debug!("Found {} in-scope links on {}", links.len(), url);
        session.stats_mut().links_discovered += links.len() as u64;

        let extracted = extract_page_text(page, self.extraction_timeout).await?;
        if extracted.fell_back {
            session.stats_mut().extraction_fallbacks += 1;
        }

        let transformed = apply_transform(self.transformer.as_ref(), &url, extracted.text).await;
        if transformed.fell_back {
            session.stats_mut().transform_fallbacks += 1;
        }

        let record = ExtractedRecord::new(url.clone(), transformed.text);
        self.persist(session, record);

        Ok(links)
    }

    fn persist(&self, session: &mut CrawlSession, record: ExtractedRecord) {
        let url = record.url().clone();

        match persist_record(self.sink.as_ref(), session.chunk_mut(), record) {
            Ok(write) => {
                tracing::info!("Saved {} ({} bytes) to chunk {}", url, write.bytes, write.index);

                let stats = session.stats_mut();
                stats.record(PageState::Persisted);
                stats.bytes_written += write.bytes;
                stats.last_chunk = stats.last_chunk.max(write.index);
            }
            Err(e) => {
                tracing::warn!("Record for {} lost: {}", url, e);
                session.stats_mut().record(PageState::PersistFailed);
            }
        }
    }

    /// Sleeps for a random delay within the configured bounds
    async fn pause(&self) {
        let delay = jitter(&self.pacing);
        if !delay.is_zero() {
            tracing::trace!("Waiting {}ms before next page", delay.as_millis());
            tokio::time::sleep(delay).await;
        }
    }
}

/// Picks a delay uniformly from the configured range
fn jitter(pacing: &CrawlerConfig) -> Duration {
    let min = pacing.min_delay_ms.min(pacing.max_delay_ms);
    let max = pacing.max_delay_ms.max(pacing.min_delay_ms);
    if max == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::rng().random_range(min..=max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jitter_within_bounds() {
        let pacing = CrawlerConfig {
            min_delay_ms: 1000,
            max_delay_ms: 3000,
        };
        for _ in 0..100 {
            let d = jitter(&pacing);
            assert!(d >= Duration::from_millis(1000));
            assert!(d <= Duration::from_millis(3000));
        }
    }

    #[test]
    fn test_jitter_zero_range() {
        let pacing = CrawlerConfig {
            min_delay_ms: 0,
            max_delay_ms: 0,
        };
        assert_eq!(jitter(&pacing), Duration::ZERO);
    }

    #[test]
    fn test_jitter_fixed_delay() {
        let pacing = CrawlerConfig {
            min_delay_ms: 5,
            max_delay_ms: 5,
        };
        assert_eq!(jitter(&pacing), Duration::from_millis(5));
    }
}
