//! Sumi-Scribe main entry point
//!
//! This is the command-line interface for the Sumi-Scribe content harvester.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use sumi_scribe::config::{
    load_config_with_hash, validate, Config, TransformCredentials, API_KEY_VAR,
};
use sumi_scribe::crawler::{ChromeRenderer, Coordinator};
use sumi_scribe::output::{print_statistics, ChunkedFileSink};
use sumi_scribe::transform::{CodeGptTransformer, ContentTransformer, IdentityTransformer};
use sumi_scribe::{canonicalize, CrawlSession};
use tracing_subscriber::EnvFilter;

/// Sumi-Scribe: a single-seed content harvester
///
/// Renders every page under the seed URL in a headless browser, extracts
/// its readable text, optionally cleans it up through an external service,
/// and appends the results to rotating text chunks.
#[derive(Parser, Debug)]
#[command(name = "sumi-scribe")]
#[command(version = "1.0.0")]
#[command(about = "A single-seed content harvester", long_about = None)]
struct Cli {
    /// URL to start from; only pages under it are visited
    #[arg(value_name = "SEED_URL")]
    seed: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the output root directory
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Skip the content cleanup service even if credentials are set
    #[arg(long)]
    no_transform: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

/// How a crawl ended without an error
enum Outcome {
    Completed,
    Interrupted,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(Outcome::Completed) => ExitCode::SUCCESS,
        Ok(Outcome::Interrupted) => ExitCode::from(130),
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<Outcome> {
    let mut config = load_configuration(cli.config.as_deref())?;

    if let Some(dir) = cli.output_dir {
        config.output.root_dir = dir.to_string_lossy().into_owned();
    }
    if cli.no_transform {
        config.transform.enabled = false;
    }
    validate(&config).context("Invalid configuration")?;

    let seed = canonicalize(&cli.seed).with_context(|| format!("Invalid seed URL: {}", cli.seed))?;

    if cli.dry_run {
        handle_dry_run(&config, &CrawlSession::new(seed));
        return Ok(Outcome::Completed);
    }

    handle_crawl(config, CrawlSession::new(seed)).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_scribe=info,warn"),
            1 => EnvFilter::new("sumi_scribe=debug,info"),
            2 => EnvFilter::new("sumi_scribe=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file if one was given, defaults otherwise
fn load_configuration(path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::info!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

/// Picks the cleanup step: the external service when enabled and
/// credentialed, pass-through otherwise
fn build_transformer(config: &Config) -> Arc<dyn ContentTransformer> {
    if !config.transform.enabled {
        tracing::info!("Content cleanup disabled");
        return Arc::new(IdentityTransformer);
    }

    let Some(credentials) = TransformCredentials::from_env() else {
        tracing::warn!(
            "{} is not set; content cleanup disabled, extracted text is saved as is",
            API_KEY_VAR
        );
        return Arc::new(IdentityTransformer);
    };

    match CodeGptTransformer::new(&config.transform, credentials) {
        Ok(transformer) => {
            if transformer.agent_id().is_none() {
                tracing::warn!("No agent id configured; the cleanup service default agent is used");
            }
            tracing::info!("Content cleanup via {}", transformer.endpoint());
            Arc::new(transformer)
        }
        Err(e) => {
            tracing::warn!("Could not set up content cleanup, continuing without it: {}", e);
            Arc::new(IdentityTransformer)
        }
    }
}

/// Handles the --dry-run mode: validates inputs and shows what would be crawled
fn handle_dry_run(config: &Config, session: &CrawlSession) {
    let credentials = TransformCredentials::from_env();
    let sink_dir = PathBuf::from(&config.output.root_dir).join(session.output_key());

    println!("=== Sumi-Scribe Dry Run ===\n");

    println!("Crawl:");
    println!("  Seed: {}", session.seed());
    println!("  Scope prefix: {}", session.scope().prefix());
    println!(
        "  Delay between pages: {}-{}ms",
        config.crawler.min_delay_ms, config.crawler.max_delay_ms
    );

    println!("\nRenderer:");
    println!("  Headless: {}", config.renderer.headless);
    println!(
        "  Viewport: {}x{}",
        config.renderer.viewport_width, config.renderer.viewport_height
    );
    println!(
        "  Timeouts: navigation {}s, ready {}s, extraction {}s, settle {}ms",
        config.renderer.navigation_timeout_secs,
        config.renderer.ready_timeout_secs,
        config.renderer.extraction_timeout_secs,
        config.renderer.settle_delay_ms
    );
    if let Some(ref exe) = config.renderer.chrome_executable {
        println!("  Executable: {}", exe);
    }

    println!("\nOutput:");
    println!("  Directory: {}", sink_dir.display());
    println!("  Chunk threshold: {} bytes", config.output.chunk_threshold_bytes);

    println!("\nContent cleanup:");
    let cleanup = match (config.transform.enabled, credentials.is_some()) {
        (false, _) => "disabled".to_string(),
        (true, false) => format!("disabled ({} not set)", API_KEY_VAR),
        (true, true) => format!("enabled ({})", config.transform.endpoint),
    };
    println!("  {}", cleanup);

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling at {}", session.seed());
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, mut session: CrawlSession) -> anyhow::Result<Outcome> {
    let transformer = build_transformer(&config);

    let sink = ChunkedFileSink::new(
        &config.output.root_dir,
        &session.output_key(),
        config.output.chunk_threshold_bytes,
    );
    tracing::info!("Writing chunks to {}", sink.dir().display());

    let renderer = Arc::new(ChromeRenderer::launch(&config.renderer).await?);

    let coordinator = Coordinator::from_config(&config, renderer.clone(), Box::new(sink))
        .with_transformer(transformer);

    let result = tokio::select! {
        result = coordinator.run(&mut session) => result.map(|()| Outcome::Completed),
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupt received, shutting down");
            Ok(Outcome::Interrupted)
        }
    };

    drop(coordinator);
    match Arc::try_unwrap(renderer) {
        Ok(renderer) => {
            if let Err(e) = renderer.shutdown().await {
                tracing::warn!("Browser shutdown failed: {}", e);
            }
        }
        Err(_) => tracing::warn!("Browser still referenced, leaving it to exit with the process"),
    }

    print_statistics(session.stats());

    match result {
        Ok(outcome) => {
            if matches!(outcome, Outcome::Completed) {
                tracing::info!("Crawl completed successfully");
            }
            Ok(outcome)
        }
        Err(e) => Err(anyhow::Error::new(e).context("Crawl failed")),
    }
}
