//! Domain types produced by the parsers and consumed by the record sink
//!
//! - `Hotel` / `HotelRef`: a hotel as discovered on a listing page and as
//!   identified on its own page
//! - `ReviewCandidate` / `Review`: a review before and after it is bound to a
//!   hotel and checked against the rating scale
//! - `PageRef`: a transient pointer used to drive pagination

mod hotel;
mod page;
mod review;

pub use hotel::{derive_hotel_id, Hotel, HotelRef};
pub use page::{PageKind, PageRef};
pub use review::{RatingScale, Review, ReviewCandidate, ValidationError};
