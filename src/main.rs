//! Artsweep main entry point
//!
//! This is the command-line front end for the artsweep gallery harvester.

use anyhow::Context;
use artsweep::config::{load_config_with_hash, Config};
use artsweep::report::{artist_listing, format_artist_listing};
use artsweep::storage::{open_storage, SessionStorage};
use artsweep::run_crawl;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Artsweep: an incremental artist gallery harvester
///
/// Artsweep walks a list of artist gallery pages, visits the artwork pages
/// each gallery links to, keeps those whose content rating is enabled, and
/// records direct image links so later runs only pick up new work.
#[derive(Parser, Debug)]
#[command(name = "artsweep")]
#[command(version = "1.0.0")]
#[command(about = "An incremental artist gallery harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Queue an artist gallery URL for the next run and exit
    #[arg(long, value_name = "URL", conflicts_with_all = ["artists", "dry_run"])]
    add: Option<String>,

    /// List known artists with their image counts and exit
    #[arg(long, conflicts_with_all = ["add", "dry_run"])]
    artists: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with_all = ["add", "artists"])]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(url) = cli.add.as_deref() {
        handle_add(&config, url)
    } else if cli.artists {
        handle_artists(&config)
    } else if cli.dry_run {
        handle_dry_run(&config)
    } else {
        handle_crawl(&config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("artsweep=info,warn"),
            1 => EnvFilter::new("artsweep=debug,info"),
            2 => EnvFilter::new("artsweep=trace,debug"),
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

/// Handles --add: appends a gallery URL to the pending list
fn handle_add(config: &Config, url: &str) -> anyhow::Result<()> {
    let mut storage = open_storage(config);
    let mut store = storage
        .load()
        .with_context(|| format!("Failed to load {}", storage.path().display()))?;

    if store.add_pending_url(url) {
        storage
            .save(&store)
            .with_context(|| format!("Failed to save {}", storage.path().display()))?;
        println!("Queued {} for the next run", url.trim());
    } else {
        println!("{} is already queued", url.trim());
    }

    Ok(())
}

/// Handles --artists: prints the artist listing from the session store
fn handle_artists(config: &Config) -> anyhow::Result<()> {
    let storage = open_storage(config);
    let store = storage
        .load()
        .with_context(|| format!("Failed to load {}", storage.path().display()))?;

    let listing = artist_listing(&store);
    if listing.is_empty() {
        println!("No artists yet");
    } else {
        println!("{}", format_artist_listing(&listing));
    }

    Ok(())
}

/// Handles --dry-run: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Artsweep Dry Run ===\n");

    println!("Scraper Configuration:");
    println!("  Request interval: {}ms", config.scraper.request_interval_ms);
    println!("  Request timeout: {}s", config.scraper.request_timeout_secs);
    println!("  Connect timeout: {}s", config.scraper.connect_timeout_secs);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nRatings:");
    println!("  rating-e: {}", config.ratings.everyone);
    println!("  rating-t: {}", config.ratings.teen);
    println!("  rating-m: {}", config.ratings.mature);
    println!("  rating-a: {}", config.ratings.adult);

    let storage = open_storage(config);
    let store = storage
        .load()
        .with_context(|| format!("Failed to load {}", storage.path().display()))?;

    println!("\nSession Store: {}", storage.path().display());
    println!("  Known artists: {}", store.artists.len());
    println!("  Deep links: {}", store.total_deep_links());

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would process {} pending galleries",
        store.pending_gallery_urls.len()
    );

    Ok(())
}

/// Handles the main harvest run
async fn handle_crawl(config: &Config) -> anyhow::Result<()> {
    let report = run_crawl(config).await.context("Run failed")?;

    for line in report.messages() {
        println!("{}", line);
    }

    tracing::info!(
        "Finished in {}s: {}",
        report.duration_seconds().unwrap_or(0),
        report.summary()
    );

    Ok(())
}
