//! Configuration module for Sumi-Scribe
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file, and reading the cleanup service credentials from the
//! environment.
//!
//! # Example
//!
//! ```no_run
//! use sumi_scribe::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scribe.toml")).unwrap();
//! println!("Chunks rotate at {} bytes", config.output.chunk_threshold_bytes);
//! ```

mod credentials;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, RendererConfig, TransformConfig,
    DEFAULT_TRANSFORM_ENDPOINT, DEFAULT_USER_AGENT,
};

pub use credentials::{TransformCredentials, AGENT_ID_VAR, API_KEY_VAR, LEGACY_AGENT_ID_VAR};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
