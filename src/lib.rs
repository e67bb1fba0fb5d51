//! Hotel-Review-Crawler: a polite review harvester
//!
//! This crate walks the paginated hotel listings of a review-aggregator site,
//! visits every hotel and its review pages, and writes one CSV row per review.
//! Extraction is driven by CSS selector rules held in configuration, so markup
//! changes on the site only require a config update.

pub mod config;
pub mod crawler;
pub mod model;
pub mod output;
pub mod parser;
pub mod robots;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for crawler operations
///
/// Only setup problems, configuration problems and output write failures
/// reach this type. Per-page and per-record failures are absorbed by the
/// coordinator and show up in the run statistics instead.
#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Setup error: {0}")]
    Setup(#[from] SetupError),

    #[error("Output error: {0}")]
    Sink(#[from] output::SinkError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fatal errors raised before or at the very start of a crawl
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Cannot open output file {path}: {source}")]
    OutputUnavailable {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Seed URL is not reachable: {0}")]
    SeedUnreachable(#[source] crawler::FetchFailure),

    #[error("Invalid seed URL '{url}': {reason}")]
    InvalidSeed { url: String, reason: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector for {rule}: {message}")]
    InvalidSelector { rule: String, message: String },
}

/// Result type alias for crawler operations
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, Coordinator, CrawlReport};
pub use model::{Hotel, Review};
pub use state::CrawlState;
