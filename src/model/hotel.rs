use sha2::{Digest, Sha256};
use url::Url;

/// A hotel as it appears on a listing page
#[derive(Debug, Clone, PartialEq)]
pub struct HotelRef {
    /// Absolute URL of the hotel's detail page
    pub url: Url,

    /// Display name from the listing (empty if the listing had none)
    pub name: String,

    /// Review count advertised next to the hotel, if the listing shows one
    pub review_count: Option<u32>,
}

/// A hotel identified from its detail page
///
/// Hotels are never persisted on their own; they only scope the reviews that
/// are collected for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hotel {
    pub id: String,
    pub name: String,
    pub location: String,
    pub url: Url,
}

impl Hotel {
    /// Builds a hotel whose id is derived from its detail-page URL
    pub fn new(url: Url, name: String, location: String) -> Self {
        Self {
            id: derive_hotel_id(&url),
            name,
            location,
            url,
        }
    }
}

/// Derives a stable hotel id from its detail-page URL
///
/// The last non-empty path segment is used (with any file extension removed),
/// e.g. `https://site/reviews/hotel_kosmos/` → `hotel_kosmos`. URLs without a
/// usable segment fall back to `hotel_` followed by 12 hex digits of the
/// SHA-256 of the URL.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use hotel_review_crawler::model::derive_hotel_id;
///
/// let url = Url::parse("https://example.com/reviews/grand_hotel.html").unwrap();
/// assert_eq!(derive_hotel_id(&url), "grand_hotel");
/// ```
pub fn derive_hotel_id(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(|s| match s.rsplit_once('.') {
            Some((stem, _ext)) if !stem.is_empty() => stem,
            _ => s,
        });

    match segment {
        Some(s) => s.to_string(),
        None => {
            let digest = Sha256::digest(url.as_str().as_bytes());
            format!("hotel_{}", &hex::encode(digest)[..12])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_trailing_slash_path() {
        let url = Url::parse("https://otzovik.com/reviews/hotel_kosmos_moscow/").unwrap();
        assert_eq!(derive_hotel_id(&url), "hotel_kosmos_moscow");
    }

    #[test]
    fn test_id_strips_extension() {
        let url = Url::parse("https://example.com/h/seaside.html").unwrap();
        assert_eq!(derive_hotel_id(&url), "seaside");
    }

    #[test]
    fn test_id_ignores_query() {
        let url = Url::parse("https://example.com/h/seaside/?ref=list").unwrap();
        assert_eq!(derive_hotel_id(&url), "seaside");
    }

    #[test]
    fn test_id_falls_back_to_hash_for_root() {
        let url = Url::parse("https://example.com/").unwrap();
        let id = derive_hotel_id(&url);
        assert!(id.starts_with("hotel_"));
        assert_eq!(id.len(), "hotel_".len() + 12);

        // Deterministic across calls
        assert_eq!(id, derive_hotel_id(&url));
    }

    #[test]
    fn test_new_derives_id() {
        let url = Url::parse("https://example.com/h/alpha/").unwrap();
        let hotel = Hotel::new(url, "Alpha".to_string(), String::new());
        assert_eq!(hotel.id, "alpha");
        assert_eq!(hotel.name, "Alpha");
    }
}
