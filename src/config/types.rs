use crate::model::RatingScale;
use crate::parser::SelectorRules;
use serde::Deserialize;

/// Main configuration structure for the crawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub rating: RatingScale,
    #[serde(default)]
    pub selectors: SelectorRules,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Listing URLs to start from, crawled in order
    pub seeds: Vec<String>,

    /// Minimum time between two successive requests (milliseconds)
    #[serde(rename = "request-delay", default = "default_request_delay")]
    pub request_delay: u64,

    /// Retries after the first attempt before a URL is skipped
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Base wait before retrying a transient failure (milliseconds, × attempt)
    #[serde(rename = "retry-delay", default = "default_retry_delay")]
    pub retry_delay: u64,

    /// Base wait after the site blocks a request (milliseconds, × attempt)
    #[serde(rename = "block-cooldown", default = "default_block_cooldown")]
    pub block_cooldown: u64,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Whether robots.txt is fetched and honored
    #[serde(rename = "respect-robots", default = "default_true")]
    pub respect_robots: bool,

    /// Maximum listing pages visited per seed
    #[serde(rename = "max-listing-pages", default)]
    pub max_listing_pages: Option<u32>,

    /// Maximum hotels taken from a single listing page
    #[serde(rename = "max-hotels-per-page", default)]
    pub max_hotels_per_page: Option<usize>,

    /// Maximum reviews written for a single hotel
    #[serde(rename = "max-reviews-per-hotel", default)]
    pub max_reviews_per_hotel: Option<usize>,

    /// Maximum reviews written in the whole run
    #[serde(rename = "max-reviews", default)]
    pub max_reviews: Option<u64>,

    /// Fallback URL pattern for the next listing page, used when a listing
    /// page could not be fetched or parsed. `{seed}` and `{page}` (1-based)
    /// are substituted.
    #[serde(rename = "listing-page-template", default)]
    pub listing_page_template: Option<String>,

    /// Lowercase body fragments that mark a response as a block page
    #[serde(rename = "block-markers", default = "default_block_markers")]
    pub block_markers: Vec<String>,
}

impl CrawlerConfig {
    /// Crawler settings for the given seeds with every other field defaulted
    pub fn with_seeds(seeds: Vec<String>) -> Self {
        Self {
            seeds,
            request_delay: default_request_delay(),
            max_retries: default_max_retries(),
            retry_delay: default_retry_delay(),
            block_cooldown: default_block_cooldown(),
            timeout: default_timeout(),
            respect_robots: default_true(),
            max_listing_pages: None,
            max_hotels_per_page: None,
            max_reviews_per_hotel: None,
            max_reviews: None,
            listing_page_template: None,
            block_markers: default_block_markers(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default = "default_contact_url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email", default = "default_contact_email")]
    pub contact_email: String,

    /// Value of the Accept-Language header
    #[serde(rename = "accept-language", default = "default_accept_language")]
    pub accept_language: String,

    /// Complete User-Agent string used instead of the composed one
    #[serde(rename = "override", default)]
    pub override_string: Option<String>,
}

impl UserAgentConfig {
    /// The User-Agent header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL; ContactEmail)` unless an
    /// override string is configured.
    pub fn header_value(&self) -> String {
        match &self.override_string {
            Some(full) => full.clone(),
            None => format!(
                "{}/{} (+{}; {})",
                self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
            ),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: default_contact_url(),
            contact_email: default_contact_email(),
            accept_language: default_accept_language(),
            override_string: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the CSV file receiving one row per review
    #[serde(rename = "csv-path", default = "default_csv_path")]
    pub csv_path: String,

    /// Path to the markdown run summary, if one should be written
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            summary_path: None,
        }
    }
}

fn default_request_delay() -> u64 {
    3000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    2000
}

fn default_block_cooldown() -> u64 {
    10_000
}

fn default_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

pub(crate) fn default_block_markers() -> Vec<String> {
    [
        "captcha",
        "доступ ограничен",
        "your access has been blocked",
        "too many requests",
        "rate limit exceeded",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_crawler_name() -> String {
    "HotelReviewCrawler".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_contact_url() -> String {
    "https://example.com/crawler".to_string()
}

fn default_contact_email() -> String {
    "crawler@example.com".to_string()
}

fn default_accept_language() -> String {
    "ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7".to_string()
}

fn default_csv_path() -> String {
    "hotel_reviews.csv".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config: Config = toml::from_str(
            r#"
[crawler]
seeds = ["https://example.com/hotels/"]
"#,
        )
        .unwrap();

        assert_eq!(config.crawler.request_delay, 3000);
        assert_eq!(config.crawler.max_retries, 3);
        assert!(config.crawler.respect_robots);
        assert_eq!(config.output.csv_path, "hotel_reviews.csv");
        assert_eq!(config.rating, RatingScale { min: 1.0, max: 5.0 });
        assert!(config.crawler.block_markers.contains(&"captcha".to_string()));
    }

    #[test]
    fn test_user_agent_header_value() {
        let ua = UserAgentConfig {
            crawler_name: "TestCrawler".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
            accept_language: "en".to_string(),
            override_string: None,
        };
        assert_eq!(
            ua.header_value(),
            "TestCrawler/1.0 (+https://example.com/about; admin@example.com)"
        );
    }

    #[test]
    fn test_user_agent_override() {
        let ua = UserAgentConfig {
            override_string: Some("Mozilla/5.0 (Macintosh)".to_string()),
            ..UserAgentConfig::default()
        };
        assert_eq!(ua.header_value(), "Mozilla/5.0 (Macintosh)");
    }
}
