//! Crawl progress tracking
//!
//! # Components
//!
//! - `CrawlState`: where the walk over one seed currently is
//! - `ListingCursor`: the hotels of one listing page and the page after it

mod crawl_state;

pub use crawl_state::{CrawlState, ListingCursor};
