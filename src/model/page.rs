use std::fmt;
use url::Url;

/// The kind of page a reference points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    /// Paginated search/category results linking to hotel pages
    Listing,

    /// Detail page of a single hotel
    Entity,

    /// Paginated list of reviews for one hotel
    Review,
}

impl PageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Listing => "listing",
            Self::Entity => "entity",
            Self::Review => "review",
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A page to visit, with its position in the pagination sequence it belongs to
///
/// `page_index` is zero-based: the seed listing page and the first review page
/// of a hotel both have index 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRef {
    pub url: Url,
    pub kind: PageKind,
    pub page_index: u32,
}

impl PageRef {
    pub fn new(url: Url, kind: PageKind, page_index: u32) -> Self {
        Self {
            url,
            kind,
            page_index,
        }
    }

    /// The first page (index 0) of a sequence
    pub fn first(url: Url, kind: PageKind) -> Self {
        Self::new(url, kind, 0)
    }

    /// Reference to the page that follows this one in the same sequence
    pub fn next(&self, url: Url) -> Self {
        Self::new(url, self.kind, self.page_index + 1)
    }
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} page #{} ({})", self.kind, self.page_index, self.url)
    }
}
