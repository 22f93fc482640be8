use crate::config::types::{Config, CrawlerConfig, OutputConfig, RendererConfig, TransformConfig};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Upper bound for the readiness wait and the extraction deadline
const MAX_BOUNDED_WAIT_SECS: u64 = 30;

/// Upper bound for a single navigation
const MAX_NAVIGATION_SECS: u64 = 300;

/// Smallest chunk threshold that still holds a realistic record
const MIN_CHUNK_THRESHOLD: u64 = 1024;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_renderer_config(&config.renderer)?;
    validate_output_config(&config.output)?;
    validate_transform_config(&config.transform)?;
    Ok(())
}

/// Validates traversal pacing
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.min_delay_ms > config.max_delay_ms {
        return Err(ConfigError::Validation(format!(
            "min_delay_ms ({}) must not exceed max_delay_ms ({})",
            config.min_delay_ms, config.max_delay_ms
        )));
    }

    Ok(())
}

/// Validates renderer timeouts, viewport, and identity
fn validate_renderer_config(config: &RendererConfig) -> ConfigResult<()> {
    if config.navigation_timeout_secs < 1 || config.navigation_timeout_secs > MAX_NAVIGATION_SECS {
        return Err(ConfigError::Validation(format!(
            "navigation_timeout_secs must be between 1 and {}, got {}",
            MAX_NAVIGATION_SECS, config.navigation_timeout_secs
        )));
    }

    for (name, value) in [
        ("ready_timeout_secs", config.ready_timeout_secs),
        ("extraction_timeout_secs", config.extraction_timeout_secs),
    ] {
        if !(1..=MAX_BOUNDED_WAIT_SECS).contains(&value) {
            return Err(ConfigError::Validation(format!(
                "{} must be between 1 and {}, got {}",
                name, MAX_BOUNDED_WAIT_SECS, value
            )));
        }
    }

    if config.viewport_width == 0 || config.viewport_height == 0 {
        return Err(ConfigError::Validation(format!(
            "viewport must be non-zero, got {}x{}",
            config.viewport_width, config.viewport_height
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if let Some(path) = &config.chrome_executable {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "chrome_executable cannot be an empty path".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.root_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "root_dir cannot be empty".to_string(),
        ));
    }

    if config.chunk_threshold_bytes < MIN_CHUNK_THRESHOLD {
        return Err(ConfigError::Validation(format!(
            "chunk_threshold_bytes must be >= {}, got {}",
            MIN_CHUNK_THRESHOLD, config.chunk_threshold_bytes
        )));
    }

    Ok(())
}

/// Validates the cleanup service endpoint
fn validate_transform_config(config: &TransformConfig) -> ConfigResult<()> {
    let url = Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid transform endpoint: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Transform endpoint '{}' must use HTTP or HTTPS",
            config.endpoint
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "transform timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.agent_id.as_deref().is_some_and(|id| id.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "transform agent-id must not be empty when set".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_delay_bounds() {
        let mut config = CrawlerConfig::default();
        config.min_delay_ms = 0;
        config.max_delay_ms = 0;
        assert!(validate_crawler_config(&config).is_ok());

        config.min_delay_ms = 2;
        config.max_delay_ms = 1;
        assert!(validate_crawler_config(&config).is_err());
    }

    #[test]
    fn test_bounded_waits() {
        let mut config = RendererConfig::default();
        config.ready_timeout_secs = 31;
        assert!(validate_renderer_config(&config).is_err());

        let mut config = RendererConfig::default();
        config.extraction_timeout_secs = 0;
        assert!(validate_renderer_config(&config).is_err());

        let mut config = RendererConfig::default();
        config.navigation_timeout_secs = 0;
        assert!(validate_renderer_config(&config).is_err());
    }

    #[test]
    fn test_viewport_and_user_agent() {
        let mut config = RendererConfig::default();
        config.viewport_width = 0;
        assert!(validate_renderer_config(&config).is_err());

        let mut config = RendererConfig::default();
        config.user_agent = "   ".to_string();
        assert!(validate_renderer_config(&config).is_err());
    }

    #[test]
    fn test_output_threshold() {
        let mut config = OutputConfig::default();
        config.chunk_threshold_bytes = 10;
        assert!(validate_output_config(&config).is_err());

        let mut config = OutputConfig::default();
        config.root_dir = String::new();
        assert!(validate_output_config(&config).is_err());
    }

    #[test]
    fn test_transform_endpoint() {
        let mut config = TransformConfig::default();
        config.endpoint = "not a url".to_string();
        assert!(matches!(
            validate_transform_config(&config).unwrap_err(),
            ConfigError::InvalidUrl(_)
        ));

        config.endpoint = "ftp://cleanup.example.com/".to_string();
        assert!(validate_transform_config(&config).is_err());
    }

    #[test]
    fn test_transform_agent_id() {
        let mut config = TransformConfig::default();
        config.agent_id = Some("docs-cleaner".to_string());
        assert!(validate_transform_config(&config).is_ok());

        config.agent_id = Some("  ".to_string());
        assert!(matches!(
            validate_transform_config(&config).unwrap_err(),
            ConfigError::Validation(_)
        ));
    }
}
