//! Crawler module: fetching, pacing, retrying and crawl coordination
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with failure classification
//! - A bounded retry combinator around fetches
//! - Minimum spacing between requests
//! - The listing → hotel → review state machine driver

mod coordinator;
mod fetcher;
mod pacer;
mod retry;

pub use coordinator::{Coordinator, CrawlReport};
pub use fetcher::{build_http_client, FailureKind, FetchFailure, Fetcher};
pub use pacer::Pacer;
pub use retry::{retry, RetryDecision, RetryPolicy, Retryable};

use crate::config::Config;
use crate::CrawlerError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the CSV output and write its header
/// 2. Build the HTTP client
/// 3. Walk every seed's listings, hotels and review pages
/// 4. Return counters for the run summary
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed, possibly with skipped units
/// * `Err(CrawlerError)` - Setup failed or the output could not be written
pub async fn crawl(config: Config) -> Result<CrawlReport, CrawlerError> {
    Coordinator::new(config)?.run().await
}
