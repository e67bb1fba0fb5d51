//! Hotel-Review-Crawler main entry point
//!
//! This is the command-line interface for the hotel review crawler.

use clap::Parser;
use hotel_review_crawler::config::{load_config_with_hash, Config};
use hotel_review_crawler::crawler::crawl;
use hotel_review_crawler::output::{print_statistics, write_markdown_summary};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Hotel-Review-Crawler: a polite review harvester
///
/// Walks the paginated hotel listings of a review site, visits every hotel
/// and its review pages, and writes one CSV row per review. Pages that fail
/// or do not match the configured selectors are skipped and counted.
#[derive(Parser, Debug)]
#[command(name = "hotel-review-crawler")]
#[command(version)]
#[command(about = "A polite hotel review harvester", long_about = None)]
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

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Write the CSV here instead of `output.csv-path`
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Override `crawler.max-listing-pages`
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    max_listing_pages: Option<u32>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    apply_overrides(&mut config, &cli)?;

    if cli.dry_run {
        handle_dry_run(&config);
    } else {
        handle_crawl(config, &config_hash, cli.quiet).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("hotel_review_crawler=info,warn"),
            1 => EnvFilter::new("hotel_review_crawler=debug,info"),
            2 => EnvFilter::new("hotel_review_crawler=trace,debug"),
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

/// Applies command-line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = &cli.output {
        let path = path.to_string_lossy().into_owned();
        if path.is_empty() {
            return Err("--output cannot be empty".into());
        }
        if config.output.summary_path.as_deref() == Some(path.as_str()) {
            return Err("--output must differ from output.summary-path".into());
        }
        tracing::info!("Writing CSV to {} (command-line override)", path);
        config.output.csv_path = path;
    }

    if let Some(max) = cli.max_listing_pages {
        config.crawler.max_listing_pages = Some(max);
    }

    Ok(())
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) {
    let crawler = &config.crawler;
    println!("=== Hotel-Review-Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Request delay: {}ms", crawler.request_delay);
    println!(
        "  Retries: {} (retry delay {}ms, block cooldown {}ms)",
        crawler.max_retries, crawler.retry_delay, crawler.block_cooldown
    );
    println!("  Timeout: {}s", crawler.timeout);
    println!("  Respect robots.txt: {}", crawler.respect_robots);
    println!("  Max listing pages: {}", limit(crawler.max_listing_pages));
    println!("  Max hotels per page: {}", limit(crawler.max_hotels_per_page));
    println!("  Max reviews per hotel: {}", limit(crawler.max_reviews_per_hotel));
    println!("  Max reviews: {}", limit(crawler.max_reviews));
    if let Some(template) = &crawler.listing_page_template {
        println!("  Listing page template: {}", template);
    }

    println!("\nUser Agent: {}", config.user_agent.header_value());
    println!("Accept-Language: {}", config.user_agent.accept_language);

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);
    if let Some(summary) = &config.output.summary_path {
        println!("  Summary: {}", summary);
    }

    println!("\nRating scale: {}..={}", config.rating.min, config.rating.max);

    println!("\nSeeds ({}):", crawler.seeds.len());
    for seed in &crawler.seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling with {} seed URLs", crawler.seeds.len());
}

fn limit<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "unlimited".to_string(), |v| v.to_string())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    config_hash: &str,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Total seed URLs: {}", config.crawler.seeds.len());
    let summary_path = config.output.summary_path.clone();

    let report = match crawl(config).await {
        Ok(report) => {
            tracing::info!("Crawl completed successfully");
            report
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    if !quiet {
        print_statistics(&report.stats);
    }

    if let Some(path) = summary_path {
        write_markdown_summary(&report, config_hash, Path::new(&path))?;
        tracing::info!("Summary written to: {}", path);
    }

    Ok(())
}
