//! Page parsers
//!
//! Each parser turns the body of one page kind into plain data. Parsers are
//! pure: no I/O, no shared state, and the page URL is only used to resolve
//! relative links. Every selector they use comes from [`CompiledRules`].

mod entity;
mod listing;
mod reviews;
mod rules;
pub mod text;

pub use entity::{parse_entity, EntityPage};
pub use listing::{parse_listing, ListingPage};
pub use reviews::{parse_reviews, ReviewPage};
pub use rules::{
    CompiledRules, EntityRules, EntitySelectors, ListingRules, ListingSelectors, ReviewRules,
    ReviewSelectors, SelectorRules,
};

use crate::model::PageKind;
use scraper::{ElementRef, Selector};
use thiserror::Error;

/// A page whose structure did not match the extraction rules
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed {kind} page: structural anchor '{anchor}' not found")]
    MalformedPage { kind: PageKind, anchor: String },
}

/// Elements under `scope` matching `selector` that are not nested in another match
///
/// Item selectors like `div.item` also hit blocks inside an item's body; only
/// the outermost match is an item.
pub(crate) fn outermost_matches<'a>(scope: ElementRef<'a>, selector: &Selector) -> Vec<ElementRef<'a>> {
    let scope_id = scope.id();
    scope
        .select(selector)
        .filter(|item| {
            item.ancestors()
                .take_while(|node| node.id() != scope_id)
                .filter_map(ElementRef::wrap)
                .all(|ancestor| !selector.matches(&ancestor))
        })
        .collect()
}
