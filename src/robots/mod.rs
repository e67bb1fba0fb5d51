//! robots.txt handling
//!
//! robots.txt is fetched once per origin, the first time a URL on that origin
//! is about to be requested, and kept for the rest of the run. Anything other
//! than a successful fetch (404, network error, block page) means the origin
//! is treated as allowing everything.

mod rules;

pub use rules::RobotsRules;

use crate::url::origin_key;
use std::collections::HashMap;
use url::Url;

/// Per-origin robots.txt rules for one run
#[derive(Debug)]
pub struct RobotsCache {
    /// Product token matched against `User-agent` lines
    agent: String,
    by_origin: HashMap<String, RobotsRules>,
}

impl RobotsCache {
    /// Creates an empty cache matching rules for the given User-Agent header
    pub fn new(user_agent: &str) -> Self {
        Self {
            agent: product_token(user_agent),
            by_origin: HashMap::new(),
        }
    }

    /// The product token rules are matched against
    pub fn agent(&self) -> &str {
        &self.agent
    }

    /// Rules for the origin of `url`, if they have been loaded
    pub fn get(&self, url: &Url) -> Option<&RobotsRules> {
        self.by_origin.get(&origin_key(url))
    }

    /// Stores the rules for the origin of `url`
    pub fn insert(&mut self, url: &Url, rules: RobotsRules) {
        self.by_origin.insert(origin_key(url), rules);
    }

    /// Whether `url` may be fetched; unknown origins are allowed
    pub fn allows(&self, url: &Url) -> bool {
        self.get(url)
            .map_or(true, |rules| rules.allows(url, &self.agent))
    }
}

/// URL of the robots.txt governing `url`
pub fn robots_url(url: &Url) -> Option<Url> {
    url.join("/robots.txt").ok()
}

/// Extracts the product token (`Name` in `Name/1.0 (...)`) from a User-Agent
///
/// # Examples
///
/// ```
/// use hotel_review_crawler::robots::product_token;
///
/// assert_eq!(product_token("HotelReviewCrawler/1.0 (+https://x; a@b.c)"), "HotelReviewCrawler");
/// assert_eq!(product_token("Mozilla/5.0 (X11)"), "Mozilla");
/// ```
pub fn product_token(user_agent: &str) -> String {
    user_agent
        .split(|c: char| c == '/' || c.is_whitespace())
        .next()
        .unwrap_or_default()
        .to_string()
}
