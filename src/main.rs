//! Sitemapper main entry point
//!
//! This is the command-line interface for the Sitemapper sitemap generator.

use anyhow::Context;
use clap::Parser;
use sitemapper::config::{load_config, validate, Config};
use sitemapper::crawler::run_crawl;
use sitemapper::output::{print_statistics, write_sitemap, CrawlStatistics};
use sitemapper::url::{canonicalize_seed, ensure_scheme};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Sitemapper: a single-domain sitemap generator
///
/// Sitemapper crawls every HTML page reachable from a starting URL on the
/// same domain and writes them to a sitemaps.org XML file.
#[derive(Parser, Debug)]
#[command(name = "sitemapper")]
#[command(version = "1.0.0")]
#[command(about = "A single-domain sitemap generator", long_about = None)]
struct Cli {
    /// Starting URL (prompted for when omitted)
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Sitemap output path
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Number of concurrent fetch workers
    #[arg(short = 'j', long, value_name = "WORKERS")]
    workers: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Leave pages whose fetch failed out of the sitemap
    #[arg(long)]
    exclude_failed: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    let raw = match &cli.url {
        Some(url) => url.clone(),
        None => prompt_for_url().context("Failed to read the starting URL")?,
    };

    let seed = match canonicalize_seed(&ensure_scheme(&raw)) {
        Ok(seed) => seed,
        Err(e) => {
            tracing::error!("Invalid starting URL '{}': {}", raw.trim(), e);
            return Err(e).context("Invalid starting URL");
        }
    };

    handle_crawl(seed, &config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemapper=info,warn"),
            1 => EnvFilter::new("sitemapper=debug,info"),
            2 => EnvFilter::new("sitemapper=trace,debug"),
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

/// Loads the config file if given, then applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.request_timeout_secs = timeout;
    }
    if cli.exclude_failed {
        config.crawler.include_failed_pages = false;
    }
    if let Some(output) = &cli.output {
        config.output.sitemap_path = output.to_string_lossy().into_owned();
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Asks for the starting URL on stdin
fn prompt_for_url() -> std::io::Result<String> {
    print!("Enter the starting URL: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Handles the main crawl operation and writes the sitemap
async fn handle_crawl(seed: sitemapper::CanonicalUrl, config: &Config) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling with {} worker(s), {}s request timeout",
        config.crawler.workers,
        config.crawler.request_timeout_secs
    );

    let result = run_crawl(seed, config).await.context("Crawl failed")?;

    let urls = result.sitemap_urls(config.crawler.include_failed_pages);
    let path = PathBuf::from(&config.output.sitemap_path);
    let count = match write_sitemap(urls, &path) {
        Ok(count) => count,
        Err(e) => {
            tracing::error!("Failed to write sitemap {}: {}", path.display(), e);
            return Err(e).context("Failed to write sitemap");
        }
    };

    print_statistics(&CrawlStatistics::from_result(&result));
    println!();
    println!("Sitemap saved to {} ({} URLs)", path.display(), count);

    Ok(())
}
