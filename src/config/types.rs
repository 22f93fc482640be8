use serde::Deserialize;
use std::time::Duration;

/// Default desktop user agent presented by the renderer
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Default endpoint of the content cleanup service
pub const DEFAULT_TRANSFORM_ENDPOINT: &str = "https://api.codegpt.co/api/v1/chat/completions";

/// Main configuration structure for Sumi-Scribe
///
/// Every section is optional in the TOML file; missing values fall back to
/// the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub renderer: RendererConfig,
    pub output: OutputConfig,
    pub transform: TransformConfig,
}

/// Traversal pacing configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Lower bound of the randomized delay between page visits (milliseconds)
    #[serde(rename = "min-delay-ms")]
    pub min_delay_ms: u64,

    /// Upper bound of the randomized delay between page visits (milliseconds)
    #[serde(rename = "max-delay-ms")]
    pub max_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 1000,
            max_delay_ms: 3000,
        }
    }
}

/// Headless browser configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Run the browser without a window
    pub headless: bool,

    /// Optional path to a Chrome/Chromium executable
    #[serde(rename = "chrome-executable")]
    pub chrome_executable: Option<String>,

    /// Deadline for a navigation to reach DOM-ready
    #[serde(rename = "navigation-timeout-secs")]
    pub navigation_timeout_secs: u64,

    /// Deadline for the basic page readiness wait
    #[serde(rename = "ready-timeout-secs")]
    pub ready_timeout_secs: u64,

    /// Fixed pause for dynamic content after readiness (milliseconds)
    #[serde(rename = "settle-delay-ms")]
    pub settle_delay_ms: u64,

    /// Deadline for structured content extraction
    #[serde(rename = "extraction-timeout-secs")]
    pub extraction_timeout_secs: u64,

    #[serde(rename = "viewport-width")]
    pub viewport_width: u32,

    #[serde(rename = "viewport-height")]
    pub viewport_height: u32,

    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl RendererConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_executable: None,
            navigation_timeout_secs: 60,
            ready_timeout_secs: 30,
            settle_delay_ms: 2000,
            extraction_timeout_secs: 30,
            viewport_width: 1920,
            viewport_height: 1080,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory; each crawl writes under `<root-dir>/<host>/`
    #[serde(rename = "root-dir")]
    pub root_dir: String,

    /// Soft size limit of one chunk file in bytes
    #[serde(rename = "chunk-threshold-bytes")]
    pub chunk_threshold_bytes: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root_dir: "out".to_string(),
            chunk_threshold_bytes: 1_200_000,
        }
    }
}

/// Content cleanup service configuration
///
/// Credentials are never read from the file; they come from the environment
/// (see [`crate::config::TransformCredentials`]).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Allows turning the cleanup step off even when credentials exist
    pub enabled: bool,

    pub endpoint: String,

    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Agent the text is routed to when the environment names none
    #[serde(rename = "agent-id")]
    pub agent_id: Option<String>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: DEFAULT_TRANSFORM_ENDPOINT.to_string(),
            timeout_secs: 120,
            agent_id: None,
        }
    }
}
