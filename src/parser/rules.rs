//! Extraction rules: CSS selectors held as data
//!
//! `SelectorRules` is the serde-facing form read from the `[selectors.*]`
//! tables of the config file. `CompiledRules` is the same set of rules parsed
//! into `scraper::Selector`s once at startup. An empty string disables an
//! optional rule.
//!
//! The defaults target the markup of otzovik.com hotel listings.

use crate::ConfigError;
use scraper::Selector;
use serde::Deserialize;

/// All selector rules, grouped by page kind
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SelectorRules {
    pub listing: ListingRules,
    pub entity: EntityRules,
    pub reviews: ReviewRules,
}

/// Rules for listing (search/category result) pages
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ListingRules {
    /// Container every other listing rule is rooted on
    pub anchor: String,
    /// One hotel entry inside the anchor
    pub item: String,
    /// Link to the hotel page, inside an item
    pub link: String,
    /// Hotel name inside an item; empty means "use the link text"
    pub name: String,
    /// Advertised review count inside an item (optional)
    pub review_count: String,
    /// Link to the next listing page, searched in the whole document (optional)
    pub next: String,
}

impl Default for ListingRules {
    fn default() -> Self {
        Self {
            anchor: "div.product-list".to_string(),
            item: "div.item".to_string(),
            link: "a.product-name".to_string(),
            name: String::new(),
            review_count: "a.reviews-counter".to_string(),
            next: "a.pager-item.next".to_string(),
        }
    }
}

/// Rules for hotel detail pages
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EntityRules {
    /// Container holding the hotel's identity fields
    pub anchor: String,
    /// Hotel name inside the anchor
    pub name: String,
    /// Hotel location inside the anchor (optional)
    pub location: String,
    /// Links to separate review pages, searched in the whole document
    /// (optional; when nothing matches, the hotel page is its own first
    /// review page)
    pub review_links: String,
}

impl Default for EntityRules {
    fn default() -> Self {
        Self {
            anchor: "div.product-header".to_string(),
            name: "h1".to_string(),
            location: "div.product-address".to_string(),
            review_links: String::new(),
        }
    }
}

/// Rules for review-listing pages
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ReviewRules {
    /// Container every review rule is rooted on
    pub anchor: String,
    /// One review inside the anchor
    pub item: String,
    /// Rating element inside a review; its `content` attribute wins over text
    pub rating: String,
    /// Text fragments inside a review, concatenated in this order
    pub text: Vec<String>,
    /// Author inside a review (optional)
    pub author: String,
    /// Visible date inside a review (optional)
    pub date: String,
    /// Machine-readable date fallback, read from `content` (optional)
    pub date_meta: String,
    /// Link to the next review page, searched in the whole document (optional)
    pub next: String,
}

impl Default for ReviewRules {
    fn default() -> Self {
        Self {
            anchor: "div.review-list-2".to_string(),
            item: "div.item".to_string(),
            rating: "div.rating-score span".to_string(),
            text: vec![
                "h3.review-title a".to_string(),
                "div.review-teaser".to_string(),
                "div.review-plus".to_string(),
                "div.review-minus".to_string(),
            ],
            author: "div.user-info a.user-login span".to_string(),
            date: "div.review-postdate".to_string(),
            date_meta: r#"meta[itemprop="datePublished"]"#.to_string(),
            next: "a.pager-item.next".to_string(),
        }
    }
}

/// Compiled listing rules
#[derive(Debug, Clone)]
pub struct ListingSelectors {
    pub(crate) anchor_css: String,
    pub(crate) anchor: Selector,
    pub(crate) item: Selector,
    pub(crate) link: Selector,
    pub(crate) name: Option<Selector>,
    pub(crate) review_count: Option<Selector>,
    pub(crate) next: Option<Selector>,
}

/// Compiled entity rules
#[derive(Debug, Clone)]
pub struct EntitySelectors {
    pub(crate) anchor_css: String,
    pub(crate) anchor: Selector,
    pub(crate) name: Selector,
    pub(crate) location: Option<Selector>,
    pub(crate) review_links: Option<Selector>,
}

/// Compiled review rules
#[derive(Debug, Clone)]
pub struct ReviewSelectors {
    pub(crate) anchor_css: String,
    pub(crate) anchor: Selector,
    pub(crate) item: Selector,
    pub(crate) rating: Selector,
    pub(crate) text: Vec<Selector>,
    pub(crate) author: Option<Selector>,
    pub(crate) date: Option<Selector>,
    pub(crate) date_meta: Option<Selector>,
    pub(crate) next: Option<Selector>,
}

/// Every selector rule, parsed and ready for use by the parsers
#[derive(Debug, Clone)]
pub struct CompiledRules {
    pub listing: ListingSelectors,
    pub entity: EntitySelectors,
    pub reviews: ReviewSelectors,
}

impl CompiledRules {
    /// Compiles every rule, failing on the first invalid or missing selector
    pub fn compile(rules: &SelectorRules) -> Result<Self, ConfigError> {
        let l = &rules.listing;
        let listing = ListingSelectors {
            anchor_css: l.anchor.clone(),
            anchor: required("listing.anchor", &l.anchor)?,
            item: required("listing.item", &l.item)?,
            link: required("listing.link", &l.link)?,
            name: optional("listing.name", &l.name)?,
            review_count: optional("listing.review-count", &l.review_count)?,
            next: optional("listing.next", &l.next)?,
        };

        let e = &rules.entity;
        let entity = EntitySelectors {
            anchor_css: e.anchor.clone(),
            anchor: required("entity.anchor", &e.anchor)?,
            name: required("entity.name", &e.name)?,
            location: optional("entity.location", &e.location)?,
            review_links: optional("entity.review-links", &e.review_links)?,
        };

        let r = &rules.reviews;
        if r.text.is_empty() {
            return Err(ConfigError::InvalidSelector {
                rule: "reviews.text".to_string(),
                message: "at least one text selector is required".to_string(),
            });
        }
        let text = r
            .text
            .iter()
            .enumerate()
            .map(|(i, css)| required(&format!("reviews.text[{}]", i), css))
            .collect::<Result<Vec<_>, _>>()?;

        let reviews = ReviewSelectors {
            anchor_css: r.anchor.clone(),
            anchor: required("reviews.anchor", &r.anchor)?,
            item: required("reviews.item", &r.item)?,
            rating: required("reviews.rating", &r.rating)?,
            text,
            author: optional("reviews.author", &r.author)?,
            date: optional("reviews.date", &r.date)?,
            date_meta: optional("reviews.date-meta", &r.date_meta)?,
            next: optional("reviews.next", &r.next)?,
        };

        Ok(Self {
            listing,
            entity,
            reviews,
        })
    }
}

fn required(rule: &str, css: &str) -> Result<Selector, ConfigError> {
    if css.trim().is_empty() {
        return Err(ConfigError::InvalidSelector {
            rule: rule.to_string(),
            message: "selector cannot be empty".to_string(),
        });
    }

    Selector::parse(css).map_err(|e| ConfigError::InvalidSelector {
        rule: rule.to_string(),
        message: format!("'{}': {:?}", css, e),
    })
}

fn optional(rule: &str, css: &str) -> Result<Option<Selector>, ConfigError> {
    if css.trim().is_empty() {
        Ok(None)
    } else {
        required(rule, css).map(Some)
    }
}
