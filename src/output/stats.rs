//! Run statistics
//!
//! Counters are updated by the coordinator as the crawl progresses and
//! reported once at the end, on stdout and optionally as markdown.

/// Counters for one crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Seeds whose walk was started
    pub seeds: u64,

    /// Listing pages parsed successfully
    pub listing_pages: u64,

    /// Hotels whose page was parsed
    pub hotels_collected: u64,

    /// Hotels not visited (zero advertised reviews, per-page cap)
    pub hotels_skipped: u64,

    /// Review pages parsed successfully
    pub review_pages: u64,

    /// Reviews written to the sink
    pub reviews_collected: u64,

    /// Review blocks without a parsable rating
    pub reviews_unparsable: u64,

    /// Reviews rejected by validation (rating outside the scale)
    pub reviews_invalid: u64,

    /// Pages skipped after fetch failures or malformed markup
    pub units_skipped: u64,

    /// URLs skipped because robots.txt disallows them
    pub disallowed: u64,

    /// HTTP requests sent, retries and robots.txt included
    pub requests: u64,

    /// Responses classified as blocked
    pub blocked: u64,
}

impl CrawlStats {
    /// Reviews found on a page but not written
    pub fn reviews_skipped(&self) -> u64 {
        self.reviews_unparsable + self.reviews_invalid
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStats) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Seeds crawled: {}", stats.seeds);
    println!("  Listing pages: {}", stats.listing_pages);
    println!("  Hotels collected: {}", stats.hotels_collected);
    println!("  Hotels skipped: {}", stats.hotels_skipped);
    println!("  Review pages: {}", stats.review_pages);
    println!();

    println!("Reviews:");
    println!("  Collected: {}", stats.reviews_collected);
    println!(
        "  Skipped: {} ({} unparsable, {} invalid)",
        stats.reviews_skipped(),
        stats.reviews_unparsable,
        stats.reviews_invalid
    );
    println!();

    println!("Failures:");
    println!("  Units skipped: {}", stats.units_skipped);
    println!("  Disallowed by robots.txt: {}", stats.disallowed);
    println!(
        "  Blocked responses: {} of {} requests",
        stats.blocked, stats.requests
    );
}
