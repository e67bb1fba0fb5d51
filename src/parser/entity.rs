use crate::model::{Hotel, PageKind};
use crate::parser::rules::EntitySelectors;
use crate::parser::text::select_text;
use crate::parser::ParseError;
use crate::url::{page_key, resolve_link};
use scraper::Html;
use std::collections::HashSet;
use url::Url;

/// Everything extracted from one hotel page
#[derive(Debug, Clone, PartialEq)]
pub struct EntityPage {
    pub hotel: Hotel,

    /// Review pages linked from the hotel page, deduplicated, in page order.
    /// Empty when the site lists reviews on the hotel page itself.
    pub review_page_refs: Vec<Url>,
}

/// Parses a hotel page into the hotel's identity and its review page links
///
/// `fallback_name` (the name shown on the listing) is used when the page has
/// no name of its own. The hotel id is derived from `page_url`.
pub fn parse_entity(
    html: &str,
    page_url: &Url,
    fallback_name: &str,
    rules: &EntitySelectors,
) -> Result<EntityPage, ParseError> {
    let document = Html::parse_document(html);

    let anchor = document
        .select(&rules.anchor)
        .next()
        .ok_or_else(|| ParseError::MalformedPage {
            kind: PageKind::Entity,
            anchor: rules.anchor_css.clone(),
        })?;

    let name = select_text(anchor, &rules.name).unwrap_or_else(|| fallback_name.trim().to_string());
    let location = rules
        .location
        .as_ref()
        .and_then(|selector| select_text(anchor, selector))
        .unwrap_or_default();

    let mut review_page_refs = Vec::new();
    if let Some(selector) = &rules.review_links {
        let mut seen = HashSet::new();
        seen.insert(page_key(page_url));

        for href in document
            .select(selector)
            .filter_map(|a| a.value().attr("href"))
        {
            if let Some(url) = resolve_link(href, page_url) {
                if seen.insert(page_key(&url)) {
                    review_page_refs.push(url);
                }
            }
        }
    }

    Ok(EntityPage {
        hotel: Hotel::new(page_url.clone(), name, location),
        review_page_refs,
    })
}
