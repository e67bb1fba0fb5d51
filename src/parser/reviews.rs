use crate::model::{PageKind, ReviewCandidate};
use crate::parser::rules::ReviewSelectors;
use crate::parser::text::{element_text, parse_date, parse_rating, select_text};
use crate::parser::{outermost_matches, ParseError};
use crate::url::resolve_link;
use chrono::NaiveDate;
use scraper::{ElementRef, Html};
use url::Url;

/// Everything extracted from one review page
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewPage {
    /// Reviews with a parsable rating, in page order
    pub reviews: Vec<ReviewCandidate>,

    /// The next review page, if the page advertises one
    pub next_page_url: Option<Url>,

    /// Review blocks dropped because their rating could not be parsed
    pub skipped: usize,
}

/// Parses a review page into review candidates and the next-page link
///
/// A review whose rating cannot be parsed is skipped (and counted); it never
/// aborts the page. Missing author, date or text are not errors.
pub fn parse_reviews(
    html: &str,
    page_url: &Url,
    rules: &ReviewSelectors,
) -> Result<ReviewPage, ParseError> {
    let document = Html::parse_document(html);

    let anchor = document
        .select(&rules.anchor)
        .next()
        .ok_or_else(|| ParseError::MalformedPage {
            kind: PageKind::Review,
            anchor: rules.anchor_css.clone(),
        })?;

    let mut reviews = Vec::new();
    let mut skipped = 0;

    for (index, item) in outermost_matches(anchor, &rules.item).into_iter().enumerate() {
        let raw_rating = item
            .select(&rules.rating)
            .next()
            .map(|el| match el.value().attr("content") {
                Some(content) => content.to_string(),
                None => element_text(el),
            })
            .unwrap_or_default();

        let Some(rating) = parse_rating(&raw_rating) else {
            tracing::debug!(
                "Skipping review #{} on {}: unparsable rating '{}'",
                index,
                page_url,
                raw_rating
            );
            skipped += 1;
            continue;
        };

        let text = rules
            .text
            .iter()
            .filter_map(|selector| select_text(item, selector))
            .collect::<Vec<_>>()
            .join(" ");

        let author = rules
            .author
            .as_ref()
            .and_then(|selector| select_text(item, selector));

        reviews.push(ReviewCandidate {
            rating,
            text,
            author,
            date: review_date(item, rules),
        });
    }

    let next_page_url = rules.next.as_ref().and_then(|selector| {
        document
            .select(selector)
            .filter_map(|a| a.value().attr("href"))
            .find_map(|href| resolve_link(href, page_url))
    });

    Ok(ReviewPage {
        reviews,
        next_page_url,
        skipped,
    })
}

/// The visible date if it parses, else the machine-readable fallback
fn review_date(item: ElementRef<'_>, rules: &ReviewSelectors) -> Option<NaiveDate> {
    let visible = rules.date.as_ref().and_then(|selector| {
        let el = item.select(selector).next()?;
        let attr = el
            .value()
            .attr("datetime")
            .or_else(|| el.value().attr("content"));
        attr.and_then(parse_date)
            .or_else(|| parse_date(&element_text(el)))
    });

    visible.or_else(|| {
        let selector = rules.date_meta.as_ref()?;
        let content = item.select(selector).next()?.value().attr("content")?;
        parse_date(content)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{CompiledRules, SelectorRules};

    const HOTEL: &str = include_str!("../../tests/fixtures/hotel.html");

    fn rules() -> ReviewSelectors {
        CompiledRules::compile(&SelectorRules::default())
            .unwrap()
            .reviews
    }

    fn page_url() -> Url {
        Url::parse("https://example.com/reviews/hotel_kosmos_moscow/").unwrap()
    }

    #[test]
    fn test_parse_reviews_skips_unparsable_ratings() {
        let page = parse_reviews(HOTEL, &page_url(), &rules()).unwrap();

        assert_eq!(page.reviews.len(), 2);
        assert_eq!(page.skipped, 1);
    }

    #[test]
    fn test_parse_reviews_full_record() {
        let page = parse_reviews(HOTEL, &page_url(), &rules()).unwrap();
        let first = &page.reviews[0];

        assert_eq!(first.rating, 5.0);
        assert_eq!(
            first.text,
            "Отличный вид Номер чистый, персонал вежливый. Вид на ВДНХ Долгие лифты"
        );
        assert_eq!(first.author.as_deref(), Some("anna_k"));
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2025, 10, 8));
    }

    #[test]
    fn test_parse_reviews_content_attribute_and_meta_date() {
        let page = parse_reviews(HOTEL, &page_url(), &rules()).unwrap();
        let second = &page.reviews[1];

        assert_eq!(second.rating, 4.5);
        assert_eq!(second.text, "Хорошо Но шумно");
        assert_eq!(second.author, None);
        assert_eq!(second.date, NaiveDate::from_ymd_opt(2019, 10, 8));
    }

    #[test]
    fn test_parse_reviews_next_page_relative_query() {
        let page = parse_reviews(HOTEL, &page_url(), &rules()).unwrap();
        assert_eq!(
            page.next_page_url.unwrap().as_str(),
            "https://example.com/reviews/hotel_kosmos_moscow/?page=2"
        );
    }

    #[test]
    fn test_parse_reviews_empty_list() {
        let html = r#"<div class="review-list-2"></div>"#;
        let page = parse_reviews(html, &page_url(), &rules()).unwrap();

        assert!(page.reviews.is_empty());
        assert_eq!(page.skipped, 0);
        assert!(page.next_page_url.is_none());
    }

    #[test]
    fn test_parse_reviews_missing_text_is_empty_string() {
        let html = r#"<div class="review-list-2"><div class="item">
            <div class="rating-score"><span>3</span></div>
        </div></div>"#;
        let page = parse_reviews(html, &page_url(), &rules()).unwrap();

        assert_eq!(page.reviews[0].rating, 3.0);
        assert_eq!(page.reviews[0].text, "");
        assert_eq!(page.reviews[0].date, None);
    }

    #[test]
    fn test_parse_reviews_ignores_items_nested_in_a_review() {
        let html = r#"<div class="review-list-2"><div class="item">
            <div class="rating-score"><span>4</span></div>
            <div class="review-teaser">Good breakfast
                <div class="item">quoted: <div class="rating-score"><span>2</span></div></div>
            </div>
        </div></div>"#;
        let page = parse_reviews(html, &page_url(), &rules()).unwrap();

        assert_eq!(page.reviews.len(), 1);
        assert_eq!(page.reviews[0].rating, 4.0);
        assert_eq!(page.skipped, 0);
    }

    #[test]
    fn test_parse_reviews_missing_anchor_is_malformed() {
        let err = parse_reviews("<html><body>captcha</body></html>", &page_url(), &rules())
            .unwrap_err();
        assert!(matches!(
            err,
            ParseError::MalformedPage {
                kind: PageKind::Review,
                ..
            }
        ));
    }
}
