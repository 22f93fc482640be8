use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigResult;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// Sections and keys missing from the file keep their default values.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so a set of output chunks can be traced back to the
/// configuration that produced it.
pub fn compute_config_hash(path: &Path) -> ConfigResult<String> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> ConfigResult<(Config, String)> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_full_config() {
        let config_content = r#"
[crawler]
min-delay-ms = 500
max-delay-ms = 1500

[renderer]
headless = false
navigation-timeout-secs = 45
ready-timeout-secs = 20
settle-delay-ms = 1000
extraction-timeout-secs = 15
viewport-width = 1280
viewport-height = 800
user-agent = "TestAgent/1.0"

[output]
root-dir = "./harvest"
chunk-threshold-bytes = 500000

[transform]
enabled = false
endpoint = "https://cleanup.example.com/v1/chat"
timeout-secs = 30
agent-id = "docs-cleaner"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.min_delay_ms, 500);
        assert_eq!(config.crawler.max_delay_ms, 1500);
        assert!(!config.renderer.headless);
        assert_eq!(config.renderer.navigation_timeout_secs, 45);
        assert_eq!(config.renderer.viewport_width, 1280);
        assert_eq!(config.renderer.user_agent, "TestAgent/1.0");
        assert_eq!(config.output.root_dir, "./harvest");
        assert_eq!(config.output.chunk_threshold_bytes, 500_000);
        assert!(!config.transform.enabled);
        assert_eq!(config.transform.timeout_secs, 30);
        assert_eq!(config.transform.agent_id.as_deref(), Some("docs-cleaner"));
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let file = create_temp_config("[output]\nroot-dir = \"elsewhere\"\n");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.output.root_dir, "elsewhere");
        assert_eq!(config.output.chunk_threshold_bytes, 1_200_000);
        assert_eq!(config.renderer.navigation_timeout_secs, 60);
        assert_eq!(config.crawler.min_delay_ms, 1000);
        assert_eq!(config.crawler.max_delay_ms, 3000);
        assert!(config.transform.enabled);
    }

    #[test]
    fn test_empty_file_is_default_config() {
        let file = create_temp_config("");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.renderer.ready_timeout_secs, 30);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/scribe.toml"));
        assert!(matches!(result.unwrap_err(), ConfigError::Io(_)));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[crawler]
min-delay-ms = 3000
max-delay-ms = 1000
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
