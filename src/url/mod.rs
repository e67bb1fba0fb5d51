//! URL handling for the crawler
//!
//! Link resolution against the page a link was found on, the keys used for
//! loop protection, and listing-page URL templating.

use url::Url;

/// Resolves a link href to an absolute HTTP(S) URL
///
/// Returns `None` if the link should be ignored:
/// - empty hrefs and same-page `#fragment` links
/// - `javascript:`, `mailto:`, `tel:` and `data:` links
/// - hrefs that do not resolve against `base_url`
/// - non-HTTP(S) URLs after resolution
///
/// The fragment of the resolved URL is dropped.
///
/// # Examples
///
/// ```
/// use hotel_review_crawler::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/hotels/").unwrap();
/// let url = resolve_link("../reviews/kosmos/#top", &base).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/reviews/kosmos/");
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let mut absolute = base_url.join(href).ok()?;
    if absolute.scheme() != "http" && absolute.scheme() != "https" {
        return None;
    }
    absolute.set_fragment(None);
    Some(absolute)
}

/// Key identifying a page for loop protection
///
/// Two URLs that differ only by fragment are the same page. Scheme and host
/// case are already normalized by the `url` crate.
pub fn page_key(url: &Url) -> String {
    let mut key = url.clone();
    key.set_fragment(None);
    key.into()
}

/// Origin (`scheme://host[:port]`) of a URL, used to scope robots.txt
pub fn origin_key(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// Builds the URL of listing page `page` (1-based) from a template
///
/// `{seed}` is replaced by the seed URL and `{page}` by the page number.
/// Returns `None` if the result is not a valid HTTP(S) URL.
///
/// # Examples
///
/// ```
/// use hotel_review_crawler::url::expand_listing_template;
/// use url::Url;
///
/// let seed = Url::parse("https://example.com/hotels/").unwrap();
/// let url = expand_listing_template("{seed}{page}/", &seed, 3).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/hotels/3/");
/// ```
pub fn expand_listing_template(template: &str, seed: &Url, page: u32) -> Option<Url> {
    let expanded = template
        .replace("{seed}", seed.as_str())
        .replace("{page}", &page.to_string());

    let url = Url::parse(&expanded).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url),
        _ => None,
    }
}
