use crate::model::{HotelRef, PageKind};
use crate::parser::rules::ListingSelectors;
use crate::parser::text::{element_text, parse_count, select_text};
use crate::parser::{outermost_matches, ParseError};
use crate::url::resolve_link;
use scraper::Html;
use url::Url;

/// Everything extracted from one listing page
#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage {
    /// Hotels in page order
    pub hotel_refs: Vec<HotelRef>,

    /// The next listing page, if the page advertises one
    pub next_page_url: Option<Url>,
}

/// Parses a listing page into hotel references and the next-page link
///
/// Items without a usable hotel link are dropped. An empty listing is not an
/// error; a page missing the structural anchor is.
///
/// # Arguments
///
/// * `html` - The page body
/// * `page_url` - URL the page was fetched from, for resolving relative links
/// * `rules` - Compiled listing selectors
pub fn parse_listing(
    html: &str,
    page_url: &Url,
    rules: &ListingSelectors,
) -> Result<ListingPage, ParseError> {
    let document = Html::parse_document(html);

    let anchor = document
        .select(&rules.anchor)
        .next()
        .ok_or_else(|| ParseError::MalformedPage {
            kind: PageKind::Listing,
            anchor: rules.anchor_css.clone(),
        })?;

    let mut hotel_refs = Vec::new();
    for (index, item) in outermost_matches(anchor, &rules.item).into_iter().enumerate() {
        let Some(link) = item.select(&rules.link).next() else {
            tracing::debug!("Listing item #{} on {} has no hotel link", index, page_url);
            continue;
        };

        let Some(url) = link
            .value()
            .attr("href")
            .and_then(|href| resolve_link(href, page_url))
        else {
            tracing::debug!("Listing item #{} on {} has an unusable link", index, page_url);
            continue;
        };

        let name = match &rules.name {
            Some(selector) => select_text(item, selector).unwrap_or_default(),
            None => element_text(link),
        };

        let review_count = rules
            .review_count
            .as_ref()
            .and_then(|selector| select_text(item, selector))
            .and_then(|text| parse_count(&text));

        hotel_refs.push(HotelRef {
            url,
            name,
            review_count,
        });
    }

    let next_page_url = rules.next.as_ref().and_then(|selector| {
        document
            .select(selector)
            .filter_map(|a| a.value().attr("href"))
            .find_map(|href| resolve_link(href, page_url))
    });

    Ok(ListingPage {
        hotel_refs,
        next_page_url,
    })
}
