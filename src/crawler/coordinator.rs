//! Crawler coordinator: the main crawl loop
//!
//! Seeds are crawled one after the other. For each seed the coordinator
//! drives a [`CrawlState`] machine: fetch a listing page, visit each of its
//! hotels (hotel page, then review pages), follow the listing's next link,
//! until a listing page has none.
//!
//! Failure isolation happens here. A page that cannot be fetched after
//! retries, or whose markup does not match the selector rules, is logged and
//! skipped as a unit; a review that fails validation is dropped. Only setup
//! problems and output write failures end the run.

use crate::config::Config;
use crate::crawler::fetcher::{FetchFailure, Fetcher};
use crate::crawler::pacer::Pacer;
use crate::crawler::retry::{retry, RetryPolicy};
use crate::model::{Hotel, HotelRef, PageKind, PageRef};
use crate::output::{CrawlStats, CsvSink, RecordSink};
use crate::parser::{parse_entity, parse_listing, parse_reviews, CompiledRules};
use crate::robots::{robots_url, RobotsCache, RobotsRules};
use crate::state::{CrawlState, ListingCursor};
use crate::url::{expand_listing_template, page_key};
use crate::{CrawlerError, SetupError};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fs::File;
use std::time::Duration;
use url::Url;

/// Listing pages of one seed that may fail in a row before the seed is abandoned
const MAX_CONSECUTIVE_LISTING_FAILURES: u32 = 3;

/// Outcome of a completed crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub stats: CrawlStats,
    pub seeds: Vec<String>,
    pub csv_path: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Whether the run stopped at `max-reviews`
    pub cap_reached: bool,
}

impl CrawlReport {
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Main crawler coordinator structure
///
/// Owns every piece of mutable crawl state: pagination cursors, visited sets,
/// robots.txt rules, counters and the record sink.
pub struct Coordinator<S: RecordSink = CsvSink<File>> {
    config: Config,
    rules: CompiledRules,
    fetcher: Fetcher,
    pacer: Pacer,
    retry_policy: RetryPolicy,
    robots: RobotsCache,
    sink: S,
    stats: CrawlStats,
    visited_listings: HashSet<String>,
    visited_hotels: HashSet<String>,
    visited_reviews: HashSet<String>,
    cap_reached: bool,
}

impl Coordinator<CsvSink<File>> {
    /// Creates a coordinator writing to the configured CSV path
    ///
    /// The file is created (or truncated) and its header written before any
    /// request is made.
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CrawlerError)` - The output file cannot be opened, the selector
    ///   rules do not compile, or the HTTP client cannot be built
    pub fn new(config: Config) -> Result<Self, CrawlerError> {
        let path = config.output.csv_path.clone();
        let file = File::create(&path)
            .map_err(|source| SetupError::OutputUnavailable { path, source })?;
        let sink = CsvSink::new(file)?;

        Self::with_sink(config, sink)
    }
}

impl<S: RecordSink> Coordinator<S> {
    /// Creates a coordinator writing to an arbitrary sink
    pub fn with_sink(config: Config, sink: S) -> Result<Self, CrawlerError> {
        let rules = CompiledRules::compile(&config.selectors)?;
        let fetcher = Fetcher::new(&config)?;
        let pacer = Pacer::new(Duration::from_millis(config.crawler.request_delay));
        let retry_policy = RetryPolicy {
            max_retries: config.crawler.max_retries,
            retry_delay: Duration::from_millis(config.crawler.retry_delay),
            block_cooldown: Duration::from_millis(config.crawler.block_cooldown),
        };
        let robots = RobotsCache::new(&config.user_agent.header_value());

        Ok(Self {
            config,
            rules,
            fetcher,
            pacer,
            retry_policy,
            robots,
            sink,
            stats: CrawlStats::default(),
            visited_listings: HashSet::new(),
            visited_hotels: HashSet::new(),
            visited_reviews: HashSet::new(),
            cap_reached: false,
        })
    }

    /// Runs the crawl to completion
    ///
    /// Returns the run report once every seed has reached `Done` or the run
    /// cap has been hit.
    pub async fn run(mut self) -> Result<CrawlReport, CrawlerError> {
        let started_at = Utc::now();
        let seeds = self.config.crawler.seeds.clone();
        tracing::info!(
            "Starting crawl of {} seed(s), {:?} between requests",
            seeds.len(),
            self.pacer.interval()
        );

        for seed in &seeds {
            if self.cap_reached {
                break;
            }
            let seed_url = Url::parse(seed).map_err(|e| SetupError::InvalidSeed {
                url: seed.clone(),
                reason: e.to_string(),
            })?;
            self.crawl_seed(seed_url).await?;
        }

        self.sink.finish()?;
        self.stats.requests = self.fetcher.request_count();
        self.stats.blocked = self.fetcher.blocked_count();

        tracing::info!(
            "Crawl complete: {} hotel(s), {} review(s) written, {} skipped, {} unit(s) skipped",
            self.stats.hotels_collected,
            self.sink.rows_written(),
            self.stats.reviews_skipped(),
            self.stats.units_skipped
        );

        Ok(CrawlReport {
            stats: self.stats,
            seeds,
            csv_path: self.config.output.csv_path.clone(),
            started_at,
            finished_at: Utc::now(),
            cap_reached: self.cap_reached,
        })
    }

    async fn crawl_seed(&mut self, seed: Url) -> Result<(), CrawlerError> {
        tracing::info!("Crawling seed {}", seed);
        self.stats.seeds += 1;

        let mut state = CrawlState::start(seed.clone());
        let mut listing_failures = 0;

        loop {
            tracing::trace!("State: {}", state);
            state = match state {
                CrawlState::Done => break,
                CrawlState::ListingPage(page) => {
                    self.visit_listing(&seed, page, &mut listing_failures)
                        .await?
                }
                hotel_state @ CrawlState::HotelPage { .. } => {
                    if let Some(hotel_ref) = hotel_state.current_hotel().cloned() {
                        self.visit_hotel(&hotel_ref).await?;
                    }
                    hotel_state.after_hotel()
                }
            };

            if self.cap_reached {
                tracing::info!(
                    "Reached max-reviews ({}), stopping",
                    self.stats.reviews_collected
                );
                break;
            }
        }

        Ok(())
    }

    /// Handles one listing page and returns the next state
    async fn visit_listing(
        &mut self,
        seed: &Url,
        page: PageRef,
        failures: &mut u32,
    ) -> Result<CrawlState, CrawlerError> {
        if let Some(max) = self.config.crawler.max_listing_pages {
            if page.page_index >= max {
                tracing::info!("Reached max-listing-pages ({}) for {}", max, seed);
                return Ok(CrawlState::Done);
            }
        }

        if !self.visited_listings.insert(page_key(&page.url)) {
            tracing::warn!("{} was already visited, ending seed {}", page, seed);
            return Ok(CrawlState::Done);
        }

        if !self.allowed(&page.url).await {
            return Ok(self.listing_fallback(seed, &page, failures));
        }

        let html = match self.fetch_page(&page.url).await {
            Ok(html) => html,
            Err(failure) if page.page_index == 0 => {
                return Err(SetupError::SeedUnreachable(failure).into());
            }
            Err(failure) => {
                tracing::warn!("Skipping {}: {}", page, failure);
                self.stats.units_skipped += 1;
                return Ok(self.listing_fallback(seed, &page, failures));
            }
        };

        let listing = match parse_listing(&html, &page.url, &self.rules.listing) {
            Ok(listing) => listing,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", page, e);
                self.stats.units_skipped += 1;
                return Ok(self.listing_fallback(seed, &page, failures));
            }
        };

        *failures = 0;
        self.stats.listing_pages += 1;

        let mut hotels = listing.hotel_refs;
        tracing::info!("{}: {} hotel(s)", page, hotels.len());

        if let Some(max) = self.config.crawler.max_hotels_per_page {
            if hotels.len() > max {
                self.stats.hotels_skipped += (hotels.len() - max) as u64;
                hotels.truncate(max);
            }
        }

        let next = listing.next_page_url.map(|url| page.next(url));
        Ok(CrawlState::after_listing(ListingCursor {
            listing: page,
            hotels,
            next,
        }))
    }

    /// Where to go after a listing page yielded nothing usable
    ///
    /// Without a next link, the only way forward is the configured template.
    fn listing_fallback(&self, seed: &Url, page: &PageRef, failures: &mut u32) -> CrawlState {
        *failures += 1;
        if *failures >= MAX_CONSECUTIVE_LISTING_FAILURES {
            tracing::warn!(
                "{} listing pages failed in a row, ending seed {}",
                failures,
                seed
            );
            return CrawlState::Done;
        }

        let Some(template) = &self.config.crawler.listing_page_template else {
            return CrawlState::Done;
        };

        // page_index is zero-based, template page numbers start at 1
        match expand_listing_template(template, seed, page.page_index + 2) {
            Some(url) => {
                tracing::info!("Continuing with templated listing page {}", url);
                CrawlState::ListingPage(page.next(url))
            }
            None => {
                tracing::warn!("listing-page-template '{}' produced no valid URL", template);
                CrawlState::Done
            }
        }
    }

    /// Visits one hotel: its page, then every review page reachable from it
    async fn visit_hotel(&mut self, hotel_ref: &HotelRef) -> Result<(), CrawlerError> {
        if hotel_ref.review_count == Some(0) {
            tracing::debug!("Skipping {}: no reviews advertised", hotel_ref.url);
            self.stats.hotels_skipped += 1;
            return Ok(());
        }

        if !self.visited_hotels.insert(page_key(&hotel_ref.url)) {
            tracing::debug!("Hotel {} already visited", hotel_ref.url);
            return Ok(());
        }

        if !self.allowed(&hotel_ref.url).await {
            return Ok(());
        }

        let page = PageRef::first(hotel_ref.url.clone(), PageKind::Entity);
        let html = match self.fetch_page(&page.url).await {
            Ok(html) => html,
            Err(failure) => {
                tracing::warn!("Skipping {}: {}", page, failure);
                self.stats.units_skipped += 1;
                return Ok(());
            }
        };

        let entity = match parse_entity(&html, &page.url, &hotel_ref.name, &self.rules.entity) {
            Ok(entity) => entity,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", page, e);
                self.stats.units_skipped += 1;
                return Ok(());
            }
        };

        self.stats.hotels_collected += 1;
        let hotel = entity.hotel;
        let mut written = 0;

        if entity.review_page_refs.is_empty() {
            // Reviews are listed on the hotel page itself
            self.visited_reviews.insert(page_key(&page.url));
            let first = PageRef::first(page.url.clone(), PageKind::Review);
            self.crawl_reviews(&hotel, first, Some(html), &mut written)
                .await?;
        } else {
            for url in entity.review_page_refs {
                let first = PageRef::first(url, PageKind::Review);
                self.crawl_reviews(&hotel, first, None, &mut written)
                    .await?;
            }
        }

        tracing::info!(
            "Hotel {} ({}): {} review(s) written",
            hotel.id,
            hotel.name,
            written
        );
        Ok(())
    }

    /// Walks a chain of review pages starting at `first`
    ///
    /// `prefetched` is the body of `first` when it was already fetched.
    async fn crawl_reviews(
        &mut self,
        hotel: &Hotel,
        first: PageRef,
        mut prefetched: Option<String>,
        written: &mut usize,
    ) -> Result<(), CrawlerError> {
        let mut current = Some(first);

        while let Some(page) = current.take() {
            if self.review_caps_reached(*written) {
                break;
            }

            let html = match prefetched.take() {
                Some(html) => html,
                None => {
                    if !self.visited_reviews.insert(page_key(&page.url)) {
                        tracing::debug!("{} already visited", page);
                        break;
                    }
                    if !self.allowed(&page.url).await {
                        break;
                    }
                    match self.fetch_page(&page.url).await {
                        Ok(html) => html,
                        Err(failure) => {
                            tracing::warn!("Skipping {} of hotel {}: {}", page, hotel.id, failure);
                            self.stats.units_skipped += 1;
                            break;
                        }
                    }
                }
            };

            let parsed = match parse_reviews(&html, &page.url, &self.rules.reviews) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::warn!("Skipping {} of hotel {}: {}", page, hotel.id, e);
                    self.stats.units_skipped += 1;
                    break;
                }
            };

            self.stats.review_pages += 1;
            if parsed.skipped > 0 {
                tracing::info!(
                    "{} of hotel {}: skipped {} review(s) without a parsable rating",
                    page,
                    hotel.id,
                    parsed.skipped
                );
                self.stats.reviews_unparsable += parsed.skipped as u64;
            }

            for candidate in parsed.reviews {
                if self.review_caps_reached(*written) {
                    break;
                }
                match candidate.into_review(hotel, &self.config.rating) {
                    Ok(review) => {
                        self.sink.append(&review)?;
                        self.stats.reviews_collected += 1;
                        *written += 1;
                    }
                    Err(e) => {
                        tracing::warn!("Dropping review on {} of hotel {}: {}", page.url, hotel.id, e);
                        self.stats.reviews_invalid += 1;
                    }
                }
            }

            current = parsed.next_page_url.map(|url| page.next(url));
        }

        Ok(())
    }

    /// Whether the per-hotel or per-run review cap stops further writes
    fn review_caps_reached(&mut self, written_for_hotel: usize) -> bool {
        if let Some(max) = self.config.crawler.max_reviews {
            if self.stats.reviews_collected >= max {
                self.cap_reached = true;
                return true;
            }
        }
        matches!(self.config.crawler.max_reviews_per_hotel, Some(max) if written_for_hotel >= max)
    }

    /// Fetches a page through the pacer, retrying per the retry policy
    async fn fetch_page(&self, url: &Url) -> Result<String, FetchFailure> {
        let fetcher = &self.fetcher;
        let pacer = &self.pacer;

        retry(&self.retry_policy, move |attempt| async move {
            if attempt > 0 {
                tracing::debug!("Attempt {} for {}", attempt + 1, url);
            }
            pacer.wait_turn().await;
            fetcher.fetch(url).await
        })
        .await
    }

    /// Checks robots.txt for `url`, loading the origin's rules on first use
    async fn allowed(&mut self, url: &Url) -> bool {
        if !self.config.crawler.respect_robots {
            return true;
        }

        if self.robots.get(url).is_none() {
            let rules = self.load_robots(url).await;
            if let Some(delay) = rules.crawl_delay(self.robots.agent()) {
                if self.pacer.raise_to(delay) {
                    tracing::info!("robots.txt Crawl-delay raises the request interval to {:?}", delay);
                }
            }
            self.robots.insert(url, rules);
        }

        let allowed = self.robots.allows(url);
        if !allowed {
            tracing::info!("Skipping {}: disallowed by robots.txt", url);
            self.stats.disallowed += 1;
        }
        allowed
    }

    async fn load_robots(&self, url: &Url) -> RobotsRules {
        let Some(robots) = robots_url(url) else {
            return RobotsRules::allow_all();
        };

        self.pacer.wait_turn().await;
        match self.fetcher.fetch_text(&robots).await {
            Ok(body) => {
                tracing::debug!("Loaded {}", robots);
                RobotsRules::from_body(&body)
            }
            Err(failure) => {
                tracing::debug!("No usable robots.txt ({}), allowing all", failure);
                RobotsRules::allow_all()
            }
        }
    }
}
