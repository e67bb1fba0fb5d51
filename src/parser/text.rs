//! Plain-text helpers shared by the page parsers
//!
//! Everything here is pure string work: markup stripping, whitespace
//! normalization, and lenient rating/date parsing.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Node, Selector};

/// Elements whose boundaries separate words even without surrounding spaces
const BREAKING_ELEMENTS: &[&str] = &[
    "br", "p", "div", "li", "ul", "ol", "tr", "td", "th", "h1", "h2", "h3", "h4", "h5", "h6",
    "section", "article", "blockquote",
];

static RATING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)(?:[.,](\d+))?").expect("valid rating regex"));

static COUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d[\d \u{a0}]*").expect("valid count regex"));

static YEAR_MONTH_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})-(\d{1,2})-(\d{1,2})").expect("valid date regex"));

static DAY_MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})\.(\d{1,2})\.(\d{4})").expect("valid date regex"));

static DAY_MONTHNAME_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2})\s+([^\W\d_]+)\.?,?\s+(\d{4})").expect("valid date regex")
});

/// Month name prefixes, Russian (nominative, genitive, abbreviated) and English.
/// "мая" and "май" are listed before "ма*" prefixes could be confused with "мар".
const MONTH_PREFIXES: &[(&str, u32)] = &[
    ("янв", 1),
    ("фев", 2),
    ("мар", 3),
    ("апр", 4),
    ("мая", 5),
    ("май", 5),
    ("июн", 6),
    ("июл", 7),
    ("авг", 8),
    ("сен", 9),
    ("окт", 10),
    ("ноя", 11),
    ("дек", 12),
    ("jan", 1),
    ("feb", 2),
    ("mar", 3),
    ("apr", 4),
    ("may", 5),
    ("jun", 6),
    ("jul", 7),
    ("aug", 8),
    ("sep", 9),
    ("oct", 10),
    ("nov", 11),
    ("dec", 12),
];

/// Collapses runs of whitespace to a single space and trims both ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extracts the visible text of an element with markup stripped
///
/// Block-level boundaries and `<br>` act as word separators, so
/// `<p>Clean</p><p>Quiet</p>` becomes `"Clean Quiet"` while
/// `Gr<b>eat</b>` stays `"Great"`.
pub fn element_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    push_text(element, &mut out);
    normalize_whitespace(&out)
}

fn push_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                // Both edges of a block separate it from its neighbours
                let breaking = BREAKING_ELEMENTS.contains(&el.name());
                if breaking {
                    out.push(' ');
                }
                push_text(child, out);
                if breaking {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

/// Text of the first element matching `selector` inside `scope`
///
/// Returns `None` when nothing matches or the match has no visible text.
pub fn select_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
}

/// Parses a review rating such as `5`, `4,5`, `4.5` or `5 из 5`
///
/// The first number in the text wins; text without digits yields `None`.
pub fn parse_rating(raw: &str) -> Option<f64> {
    let caps = RATING.captures(raw)?;
    let whole = caps.get(1)?.as_str();
    let number = match caps.get(2) {
        Some(fraction) => format!("{}.{}", whole, fraction.as_str()),
        None => whole.to_string(),
    };
    number.parse::<f64>().ok()
}

/// Parses an advertised count such as `128 отзывов` or `1 024 reviews`
///
/// Digit groups separated by spaces (including non-breaking ones) are joined.
pub fn parse_count(raw: &str) -> Option<u32> {
    let caps = COUNT.find(raw)?;
    let digits: String = caps.as_str().chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Parses a review date in any of the formats the site uses
///
/// Accepted, in order: RFC 3339 / ISO-8601 datetimes, `YYYY-MM-DD`,
/// `DD.MM.YYYY`, and `D <month name> YYYY` with Russian or English month
/// names. Impossible dates (e.g. 31.02.2020) yield `None`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }

    if let Some(caps) = YEAR_MONTH_DAY.captures(raw) {
        return ymd(&caps[1], &caps[2], &caps[3]);
    }

    if let Some(caps) = DAY_MONTH_YEAR.captures(raw) {
        return ymd(&caps[3], &caps[2], &caps[1]);
    }

    if let Some(caps) = DAY_MONTHNAME_YEAR.captures(raw) {
        let month = month_from_name(&caps[2])?;
        let year = caps[3].parse().ok()?;
        let day = caps[1].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn month_from_name(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    MONTH_PREFIXES
        .iter()
        .find(|(prefix, _)| lower.starts_with(prefix))
        .map(|(_, month)| *month)
}
