//! Headless browser rendering
//!
//! Every visit gets its own browser context and page, so cookies and storage
//! never carry over between URLs. Image, stylesheet and font requests are
//! aborted; everything else continues untouched.
//!
//! The coordinator only sees the [`PageRenderer`] and [`RenderedPage`]
//! traits. [`ChromeRenderer`] implements them with chromiumoxide.

use crate::config::RendererConfig;
use crate::url::CanonicalUrl;
use crate::{Result, ScribeError};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, FailRequestParams,
};
use chromiumoxide::cdp::browser_protocol::network::{ErrorReason, ResourceType};
use chromiumoxide::cdp::browser_protocol::page::{EventDomContentEventFired, NavigateParams};
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

const BODY_TEXT_SCRIPT: &str = "document.body ? document.body.innerText : ''";

// SVG anchors expose `href` as an object, only string hrefs are kept
const ANCHOR_HREFS_SCRIPT: &str = "Array.from(document.querySelectorAll('a[href]')) \
     .map(a => a.href) \
     .filter(h => typeof h === 'string')";

fn browser_error(context: &str, e: CdpError) -> ScribeError {
    ScribeError::Browser(format!("{}: {}", context, e))
}

/// Produces rendered pages
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Opens a fresh page, navigates to `url` and waits for it to settle
    ///
    /// Navigation failures are returned as errors; anything opened for the
    /// attempt is released first.
    async fn render(&self, url: &CanonicalUrl) -> Result<Box<dyn RenderedPage>>;
}

/// One navigated page, owned by a single visit
///
/// `close` releases the page and its browser context. It is safe to call
/// more than once, and dropping an unclosed page still releases it.
#[async_trait]
pub trait RenderedPage: Send + Sync {
    /// The canonical URL this page was rendered for
    fn url(&self) -> &CanonicalUrl;

    /// The serialized DOM
    async fn document_html(&self) -> Result<String>;

    /// The rendered text of the document body
    async fn raw_text(&self) -> Result<String>;

    /// Resolved `href` of every anchor, in document order
    async fn anchor_hrefs(&self) -> Result<Vec<String>>;

    async fn close(&mut self) -> Result<()>;
}

/// Renderer backed by a single Chrome/Chromium process
pub struct ChromeRenderer {
    browser: Arc<Browser>,
    handler: JoinHandle<()>,
    config: RendererConfig,
}

impl ChromeRenderer {
    /// Launches the browser
    ///
    /// # Arguments
    ///
    /// * `config` - Renderer settings (headless mode, executable, viewport, timeouts)
    ///
    /// # Returns
    ///
    /// * `Ok(ChromeRenderer)` - Browser is running and its event loop spawned
    /// * `Err(ScribeError)` - Chrome could not be found or started
    pub async fn launch(config: &RendererConfig) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .window_size(config.viewport_width, config.viewport_height)
            .request_timeout(config.navigation_timeout());

        if !config.headless {
            builder = builder.with_head();
        }

        if let Some(ref path) = config.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        let browser_config = builder
            .build()
            .map_err(|e| ScribeError::Browser(format!("Invalid browser configuration: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            ScribeError::Browser(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed?",
                e
            ))
        })?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("Browser handler event error: {}", e);
                }
            }
        });

        tracing::info!(
            "Browser launched ({}, {}x{})",
            if config.headless { "headless" } else { "headed" },
            config.viewport_width,
            config.viewport_height
        );

        Ok(Self {
            browser: Arc::new(browser),
            handler,
            config: config.clone(),
        })
    }

    /// Closes the browser process
    ///
    /// If pages are still alive elsewhere the process is left to be killed
    /// when the last handle drops.
    pub async fn shutdown(self) -> Result<()> {
        let result = match Arc::try_unwrap(self.browser) {
            Ok(mut browser) => {
                let closed = browser.close().await.map(|_| ());
                if let Err(e) = browser.wait().await {
                    tracing::debug!("Waiting for browser exit failed: {}", e);
                }
                closed.map_err(|e| browser_error("Failed to close browser", e))
            }
            Err(_) => {
                tracing::warn!("Browser still in use at shutdown; leaving it to be dropped");
                Ok(())
            }
        };

        self.handler.abort();
        tracing::info!("Browser shut down");
        result
    }

    async fn open_page(&self, url: &CanonicalUrl) -> Result<ChromePage> {
        let context = self
            .browser
            .execute(CreateBrowserContextParams::default())
            .await
            .map_err(|e| browser_error("Failed to create browser context", e))?
            .result
            .browser_context_id;

        let target = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(context.clone())
            .build()
            .map_err(ScribeError::Browser)?;

        let page = match self.browser.new_page(target).await {
            Ok(page) => page,
            Err(e) => {
                release(self.browser.clone(), None, Some(context)).await;
                return Err(browser_error("Failed to open page", e));
            }
        };

        Ok(ChromePage {
            url: url.clone(),
            browser: self.browser.clone(),
            page: Some(page),
            context: Some(context),
            interceptor: None,
        })
    }

    /// Applies viewport, user agent and request blocking to a fresh page
    async fn prepare(&self, page: &mut ChromePage) -> Result<()> {
        let inner = page.page()?.clone();

        let metrics = SetDeviceMetricsOverrideParams::builder()
            .width(self.config.viewport_width as i64)
            .height(self.config.viewport_height as i64)
            .device_scale_factor(1.0)
            .mobile(false)
            .build()
            .map_err(ScribeError::Browser)?;
        inner
            .execute(metrics)
            .await
            .map_err(|e| browser_error("Failed to set viewport", e))?;

        inner
            .set_user_agent(self.config.user_agent.as_str())
            .await
            .map_err(|e| browser_error("Failed to set user agent", e))?;

        let mut paused = inner
            .event_listener::<EventRequestPaused>()
            .await
            .map_err(|e| browser_error("Failed to listen for requests", e))?;

        let intercept = inner.clone();
        page.interceptor = Some(tokio::spawn(async move {
            while let Some(event) = paused.next().await {
                let outcome = if is_blocked(&event.resource_type) {
                    intercept
                        .execute(FailRequestParams::new(
                            event.request_id.clone(),
                            ErrorReason::BlockedByClient,
                        ))
                        .await
                        .map(|_| ())
                } else {
                    intercept
                        .execute(ContinueRequestParams::new(event.request_id.clone()))
                        .await
                        .map(|_| ())
                };

                if let Err(e) = outcome {
                    tracing::trace!("Request interception reply failed: {}", e);
                }
            }
        }));

        inner
            .execute(EnableParams::default())
            .await
            .map_err(|e| browser_error("Failed to enable request interception", e))?;

        Ok(())
    }

    /// Navigates and waits for the page to become usable
    ///
    /// The navigation deadline bounds the wait for the main document's
    /// DOMContentLoaded. The rest of the load gets the readiness deadline,
    /// and running out of it only logs a warning.
    async fn navigate(&self, page: &ChromePage) -> Result<()> {
        let inner = page.page()?;
        let url = page.url.as_str();
        let nav_timeout = self.config.navigation_timeout();

        let mut dom_events = inner
            .event_listener::<EventDomContentEventFired>()
            .await
            .map_err(|e| browser_error("Failed to listen for DOMContentLoaded", e))?;
        let dom_ready = async move {
            if dom_events.next().await.is_none() {
                std::future::pending::<()>().await;
            }
        };

        let navigation = async {
            inner
                .execute(NavigateParams::new(url))
                .await
                .map(|response| response.result.error_text.clone())
                .map_err(|e| e.to_string())
        };

        let readiness = await_ready(navigation, dom_ready, nav_timeout, self.config.ready_timeout())
            .await
            .map_err(|failure| match failure {
                NavigationFailure::TimedOut => ScribeError::NavigationTimeout {
                    url: url.to_string(),
                    seconds: nav_timeout.as_secs(),
                },
                NavigationFailure::Failed(message) => ScribeError::Navigation {
                    url: url.to_string(),
                    message,
                },
            })?;

        if let Readiness::DomOnly(reason) = readiness {
            tracing::warn!("Page {} not fully loaded ({}), continuing with current state", url, reason);
        }

        tokio::time::sleep(self.config.settle_delay()).await;
        Ok(())
    }
}

/// Reply to the navigate command: the browser's error text if the
/// navigation itself failed, or a protocol error
type NavigateReply = std::result::Result<Option<String>, String>;

/// How far a page got before its deadlines
#[derive(Debug, PartialEq)]
enum Readiness {
    Loaded,
    /// DOMContentLoaded fired but the full load did not finish
    DomOnly(String),
}

#[derive(Debug, PartialEq)]
enum NavigationFailure {
    TimedOut,
    Failed(String),
}

/// Waits for DOMContentLoaded (or an earlier navigation result) within
/// `nav_timeout`, then gives the remaining load up to `ready_timeout`
async fn await_ready<N, D>(
    navigation: N,
    dom_ready: D,
    nav_timeout: Duration,
    ready_timeout: Duration,
) -> std::result::Result<Readiness, NavigationFailure>
where
    N: Future<Output = NavigateReply>,
    D: Future<Output = ()>,
{
    tokio::pin!(navigation);

    let first = tokio::time::timeout(nav_timeout, async {
        tokio::select! {
            reply = &mut navigation => Some(reply),
            () = dom_ready => None,
        }
    })
    .await
    .map_err(|_| NavigationFailure::TimedOut)?;

    match first {
        Some(Ok(None)) => Ok(Readiness::Loaded),
        Some(Ok(Some(error_text))) => Err(NavigationFailure::Failed(error_text)),
        Some(Err(message)) => Err(NavigationFailure::Failed(message)),
        None => match tokio::time::timeout(ready_timeout, navigation).await {
            Ok(Ok(None)) => Ok(Readiness::Loaded),
            Ok(Ok(Some(error_text))) => Err(NavigationFailure::Failed(error_text)),
            Ok(Err(message)) => Ok(Readiness::DomOnly(message)),
            Err(_) => Ok(Readiness::DomOnly(format!(
                "load still pending after {}s",
                ready_timeout.as_secs_f32()
            ))),
        },
    }
}

/// Keeps the string entries of an evaluated href list
fn decode_hrefs(value: serde_json::Value) -> Result<Vec<String>> {
    match value {
        serde_json::Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(href) => Some(href),
                _ => None,
            })
            .collect()),
        other => Err(ScribeError::Browser(format!(
            "Unexpected anchor list: {}",
            other
        ))),
    }
}

#[async_trait]
impl PageRenderer for ChromeRenderer {
    async fn render(&self, url: &CanonicalUrl) -> Result<Box<dyn RenderedPage>> {
        let mut page = self.open_page(url).await?;

        let loaded = match self.prepare(&mut page).await {
            Ok(()) => self.navigate(&page).await,
            Err(e) => Err(e),
        };

        if let Err(e) = loaded {
            if let Err(close_err) = page.close().await {
                tracing::debug!("Cleanup after failed render of {}: {}", url, close_err);
            }
            return Err(e);
        }

        tracing::debug!("Rendered {}", url);
        Ok(Box::new(page))
    }
}

fn is_blocked(resource_type: &ResourceType) -> bool {
    matches!(
        resource_type,
        ResourceType::Image | ResourceType::Stylesheet | ResourceType::Font
    )
}

/// A page opened in its own browser context
pub struct ChromePage {
    url: CanonicalUrl,
    browser: Arc<Browser>,
    page: Option<Page>,
    context: Option<BrowserContextId>,
    interceptor: Option<JoinHandle<()>>,
}

impl ChromePage {
    fn page(&self) -> Result<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| ScribeError::Browser(format!("Page for {} is already closed", self.url)))
    }

    async fn evaluate_string(&self, script: &str) -> Result<String> {
        self.page()?
            .evaluate(script)
            .await
            .map_err(|e| browser_error("Script evaluation failed", e))?
            .into_value::<String>()
            .map_err(|e| ScribeError::Browser(format!("Unexpected script result: {}", e)))
    }
}

#[async_trait]
impl RenderedPage for ChromePage {
    fn url(&self) -> &CanonicalUrl {
        &self.url
    }

    async fn document_html(&self) -> Result<String> {
        self.page()?
            .content()
            .await
            .map_err(|e| browser_error("Failed to read document", e))
    }

    async fn raw_text(&self) -> Result<String> {
        self.evaluate_string(BODY_TEXT_SCRIPT).await
    }

    async fn anchor_hrefs(&self) -> Result<Vec<String>> {
        self.page()?
            .evaluate(ANCHOR_HREFS_SCRIPT)
            .await
            .map_err(|e| browser_error("Script evaluation failed", e))?
            .into_value::<serde_json::Value>()
            .map_err(|e| ScribeError::Browser(format!("Unexpected anchor list: {}", e)))
            .and_then(decode_hrefs)
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(task) = self.interceptor.take() {
            task.abort();
        }

        let page = self.page.take();
        let context = self.context.take();
        if page.is_none() && context.is_none() {
            return Ok(());
        }

        release(self.browser.clone(), page, context).await;
        Ok(())
    }
}

impl Drop for ChromePage {
    fn drop(&mut self) {
        if let Some(task) = self.interceptor.take() {
            task.abort();
        }

        let page = self.page.take();
        let context = self.context.take();
        if page.is_none() && context.is_none() {
            return;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let browser = self.browser.clone();
                handle.spawn(release(browser, page, context));
            }
            Err(_) => tracing::warn!(
                "Page for {} dropped outside the runtime; it stays open until the browser exits",
                self.url
            ),
        }
    }
}

/// Closes a page and disposes its browser context, logging failures
async fn release(browser: Arc<Browser>, page: Option<Page>, context: Option<BrowserContextId>) {
    if let Some(page) = page {
        if let Err(e) = page.close().await {
            tracing::debug!("Failed to close page: {}", e);
        }
    }

    if let Some(id) = context {
        if let Err(e) = browser.execute(DisposeBrowserContextParams::new(id)).await {
            tracing::debug!("Failed to dispose browser context: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    const NAV: Duration = Duration::from_millis(200);
    const READY: Duration = Duration::from_millis(100);

    async fn after(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[test]
    fn test_blocked_resource_types() {
        assert!(is_blocked(&ResourceType::Image));
        assert!(is_blocked(&ResourceType::Stylesheet));
        assert!(is_blocked(&ResourceType::Font));
    }

    #[test]
    fn test_other_resource_types_continue() {
        assert!(!is_blocked(&ResourceType::Document));
        assert!(!is_blocked(&ResourceType::Script));
        assert!(!is_blocked(&ResourceType::Xhr));
        assert!(!is_blocked(&ResourceType::Fetch));
    }

    #[test]
    fn test_svg_anchor_objects_are_skipped() {
        let value = json!(["https://a.com/docs/one", {}, "https://a.com/docs/two", null]);
        assert_eq!(
            decode_hrefs(value).unwrap(),
            vec!["https://a.com/docs/one", "https://a.com/docs/two"]
        );
    }

    #[test]
    fn test_non_array_href_list_is_an_error() {
        assert!(decode_hrefs(json!({})).is_err());
    }

    #[tokio::test]
    async fn test_slow_load_after_dom_ready_is_not_a_timeout() {
        let navigation = async {
            after(300).await;
            Ok(None)
        };
        let readiness = await_ready(navigation, after(10), NAV, Duration::from_millis(500))
            .await
            .unwrap();
        assert_eq!(readiness, Readiness::Loaded);
    }

    #[tokio::test]
    async fn test_unfinished_load_continues_with_dom() {
        let navigation = std::future::pending::<NavigateReply>();
        let readiness = await_ready(navigation, after(10), NAV, READY).await.unwrap();
        assert!(matches!(readiness, Readiness::DomOnly(_)));
    }

    #[tokio::test]
    async fn test_no_dom_ready_within_deadline_times_out() {
        let navigation = std::future::pending::<NavigateReply>();
        let dom_ready = std::future::pending::<()>();
        let err = await_ready(navigation, dom_ready, NAV, READY).await.unwrap_err();
        assert_eq!(err, NavigationFailure::TimedOut);
    }

    #[tokio::test]
    async fn test_navigation_error_fails_the_visit() {
        let navigation = async { Ok(Some("net::ERR_NAME_NOT_RESOLVED".to_string())) };
        let err = await_ready(navigation, std::future::pending::<()>(), NAV, READY)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            NavigationFailure::Failed("net::ERR_NAME_NOT_RESOLVED".to_string())
        );
    }

    #[tokio::test]
    async fn test_protocol_error_after_dom_ready_is_tolerated() {
        let navigation = async {
            after(30).await;
            Err("Request timed out.".to_string())
        };
        let readiness = await_ready(navigation, after(5), NAV, READY).await.unwrap();
        assert_eq!(readiness, Readiness::DomOnly("Request timed out.".to_string()));
    }
}
