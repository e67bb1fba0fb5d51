//! The orchestrator's state machine
//!
//! One seed is walked as
//! `ListingPage → HotelPage(0) → … → HotelPage(n-1) → ListingPage → … → Done`.
//! Transitions are pure; the coordinator performs the I/O for the current
//! state and then asks for the next one.

use crate::model::{HotelRef, PageKind, PageRef};
use std::fmt;
use url::Url;

/// Hotels taken from one listing page, plus where to go after them
#[derive(Debug, Clone, PartialEq)]
pub struct ListingCursor {
    /// The listing page the hotels were read from
    pub listing: PageRef,
    pub hotels: Vec<HotelRef>,
    /// The following listing page, if any
    pub next: Option<PageRef>,
}

impl ListingCursor {
    /// State after the last hotel of this batch
    fn after_batch(self) -> CrawlState {
        match self.next {
            Some(page) => CrawlState::ListingPage(page),
            None => CrawlState::Done,
        }
    }
}

/// Where the crawl of one seed currently is
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlState {
    /// About to fetch and parse a listing page
    ListingPage(PageRef),

    /// About to visit hotel `index` of the current listing batch
    HotelPage { cursor: ListingCursor, index: usize },

    /// Nothing left to do for this seed
    Done,
}

impl CrawlState {
    /// Initial state for a seed listing URL
    pub fn start(seed: Url) -> Self {
        Self::ListingPage(PageRef::first(seed, PageKind::Listing))
    }

    /// State after a listing page yielded `cursor`
    ///
    /// An empty batch moves straight on to the next listing page (or `Done`).
    pub fn after_listing(cursor: ListingCursor) -> Self {
        if cursor.hotels.is_empty() {
            cursor.after_batch()
        } else {
            Self::HotelPage { cursor, index: 0 }
        }
    }

    /// State after the current hotel has been handled
    ///
    /// Any state other than `HotelPage` is returned unchanged.
    pub fn after_hotel(self) -> Self {
        match self {
            Self::HotelPage { cursor, index } if index + 1 < cursor.hotels.len() => {
                Self::HotelPage {
                    cursor,
                    index: index + 1,
                }
            }
            Self::HotelPage { cursor, .. } => cursor.after_batch(),
            other => other,
        }
    }

    /// The hotel the state points at, if it is a `HotelPage`
    pub fn current_hotel(&self) -> Option<&HotelRef> {
        match self {
            Self::HotelPage { cursor, index } => cursor.hotels.get(*index),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ListingPage(page) => write!(f, "ListingPage({})", page.page_index),
            Self::HotelPage { cursor, index } => write!(
                f,
                "HotelPage({}/{}, listing #{})",
                index + 1,
                cursor.hotels.len(),
                cursor.listing.page_index
            ),
            Self::Done => f.write_str("Done"),
        }
    }
}
