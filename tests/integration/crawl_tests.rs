//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small review site and run the full
//! listing → hotel → review cycle against it.

use hotel_review_crawler::config::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use hotel_review_crawler::crawler::{crawl, Coordinator, CrawlReport};
use hotel_review_crawler::output::CSV_HEADER;
use hotel_review_crawler::{CrawlerError, SetupError};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling `seed` into `csv_path`
fn create_test_config(seed: String, csv_path: &Path) -> Config {
    let mut crawler = CrawlerConfig::with_seeds(vec![seed]);
    crawler.request_delay = 10; // Very short for testing
    crawler.retry_delay = 10;
    crawler.block_cooldown = 10;
    crawler.max_retries = 1;
    crawler.timeout = 5;
    crawler.respect_robots = false;

    Config {
        crawler,
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
            ..UserAgentConfig::default()
        },
        output: OutputConfig {
            csv_path: csv_path.to_string_lossy().into_owned(),
            summary_path: None,
        },
        rating: Default::default(),
        selectors: Default::default(),
    }
}

fn listing_html(hotels: &[(&str, &str)], next: Option<&str>) -> String {
    let items: String = hotels
        .iter()
        .map(|(href, name)| {
            format!(
                r#"<div class="item"><a class="product-name" href="{}">{}</a></div>"#,
                href, name
            )
        })
        .collect();
    let pager = next
        .map(|n| format!(r#"<a class="pager-item next" href="{}">next</a>"#, n))
        .unwrap_or_default();

    format!(
        r#"<html><body><div class="product-list">{}</div><div class="pager">{}</div></body></html>"#,
        items, pager
    )
}

fn hotel_html(name: &str, reviews: &[(&str, &str)], next: Option<&str>) -> String {
    let items: String = reviews
        .iter()
        .map(|(rating, text)| {
            format!(
                r#"<div class="item"><div class="rating-score"><span>{}</span></div><div class="review-teaser">{}</div></div>"#,
                rating, text
            )
        })
        .collect();
    let pager = next
        .map(|n| format!(r#"<a class="pager-item next" href="{}">next</a>"#, n))
        .unwrap_or_default();

    format!(
        r#"<html><body><div class="product-header"><h1>{}</h1></div><div class="review-list-2">{}</div>{}</body></html>"#,
        name, items, pager
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

async fn mount_html(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(html(body))
        .mount(server)
        .await;
}

/// Serves a listing of two hotels, each with ratings "5" and "n/a"
async fn mount_two_hotel_site(server: &MockServer) {
    mount_html(
        server,
        "/hotels/",
        listing_html(
            &[
                ("/reviews/hotel_a/", "Hotel A"),
                ("/reviews/hotel_b/", "Hotel B"),
            ],
            None,
        ),
    )
    .await;
    mount_html(
        server,
        "/reviews/hotel_a/",
        hotel_html("Hotel A", &[("5", "Great stay"), ("n/a", "No rating")], None),
    )
    .await;
    mount_html(
        server,
        "/reviews/hotel_b/",
        hotel_html("Hotel B", &[("5", "Lovely, quiet"), ("n/a", "Meh")], None),
    )
    .await;
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::Reader::from_path(path).expect("Failed to open CSV");
    let headers = reader.headers().expect("Missing header").clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), CSV_HEADER.to_vec());

    reader
        .records()
        .map(|r| r.expect("Bad CSV record").iter().map(str::to_string).collect())
        .collect()
}

async fn run(config: Config) -> CrawlReport {
    let coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    coordinator.run().await.expect("Crawl failed")
}

fn csv_path(dir: &TempDir) -> PathBuf {
    dir.path().join("reviews.csv")
}

#[tokio::test]
async fn test_end_to_end_two_hotels() {
    let server = MockServer::start().await;
    mount_two_hotel_site(&server).await;

    let dir = TempDir::new().unwrap();
    let out = csv_path(&dir);
    let report = run(create_test_config(format!("{}/hotels/", server.uri()), &out)).await;

    let rows = read_rows(&out);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], vec!["hotel_a", "Hotel A", "5", "Great stay", "", ""]);
    assert_eq!(rows[1], vec!["hotel_b", "Hotel B", "5", "Lovely, quiet", "", ""]);

    assert_eq!(report.stats.hotels_collected, 2);
    assert_eq!(report.stats.reviews_collected, 2);
    assert_eq!(report.stats.reviews_skipped(), 2);
    assert_eq!(report.stats.units_skipped, 0);
    assert!(!report.cap_reached);
}

#[tokio::test]
async fn test_rerun_is_byte_identical() {
    let server = MockServer::start().await;
    mount_two_hotel_site(&server).await;

    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");

    run(create_test_config(format!("{}/hotels/", server.uri()), &first)).await;
    run(create_test_config(format!("{}/hotels/", server.uri()), &second)).await;

    assert_eq!(
        std::fs::read(&first).unwrap(),
        std::fs::read(&second).unwrap()
    );
}

#[tokio::test]
async fn test_empty_listing_finishes_without_error() {
    let server = MockServer::start().await;
    mount_html(&server, "/hotels/", listing_html(&[], None)).await;

    let dir = TempDir::new().unwrap();
    let out = csv_path(&dir);
    let report = run(create_test_config(format!("{}/hotels/", server.uri()), &out)).await;

    assert_eq!(
        std::fs::read_to_string(&out).unwrap(),
        "hotel_id,hotel_name,rating,review_text,author,date\n"
    );
    assert_eq!(report.stats.listing_pages, 1);
    assert_eq!(report.stats.hotels_collected, 0);
}

#[tokio::test]
async fn test_malformed_hotel_page_is_skipped() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/hotels/",
        listing_html(
            &[
                ("/reviews/broken/", "Broken"),
                ("/reviews/hotel_ok/", "Hotel OK"),
            ],
            None,
        ),
    )
    .await;
    mount_html(
        &server,
        "/reviews/broken/",
        "<html><body><p>Page moved</p></body></html>".to_string(),
    )
    .await;
    mount_html(
        &server,
        "/reviews/hotel_ok/",
        hotel_html("Hotel OK", &[("4", "Fine")], None),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let out = csv_path(&dir);
    let report = run(create_test_config(format!("{}/hotels/", server.uri()), &out)).await;

    let rows = read_rows(&out);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], "hotel_ok");
    assert_eq!(report.stats.units_skipped, 1);
    assert_eq!(report.stats.hotels_collected, 1);
}

#[tokio::test]
async fn test_server_error_is_retried_then_skipped() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/hotels/",
        listing_html(
            &[
                ("/reviews/down/", "Down"),
                ("/reviews/hotel_up/", "Hotel Up"),
            ],
            None,
        ),
    )
    .await;

    // First attempt plus one retry
    Mock::given(method("GET"))
        .and(path("/reviews/down/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    mount_html(
        &server,
        "/reviews/hotel_up/",
        hotel_html("Hotel Up", &[("3", "Average")], None),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let out = csv_path(&dir);
    let report = run(create_test_config(format!("{}/hotels/", server.uri()), &out)).await;

    assert_eq!(read_rows(&out).len(), 1);
    assert_eq!(report.stats.units_skipped, 1);
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/hotels/",
        listing_html(&[("/reviews/gone/", "Gone")], None),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/reviews/gone/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let report = run(create_test_config(
        format!("{}/hotels/", server.uri()),
        &csv_path(&dir),
    ))
    .await;

    assert_eq!(report.stats.units_skipped, 1);
}

#[tokio::test]
async fn test_blocked_response_is_counted() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/hotels/",
        listing_html(&[("/reviews/busy/", "Busy")], None),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/reviews/busy/"))
        .respond_with(ResponseTemplate::new(429))
        .expect(2)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let report = run(create_test_config(
        format!("{}/hotels/", server.uri()),
        &csv_path(&dir),
    ))
    .await;

    assert_eq!(report.stats.blocked, 2);
    assert_eq!(report.stats.units_skipped, 1);
}

#[tokio::test]
async fn test_unreachable_seed_is_setup_error() {
    let server = MockServer::start().await;
    // Nothing mounted: every path is a 404

    let dir = TempDir::new().unwrap();
    let config = create_test_config(format!("{}/hotels/", server.uri()), &csv_path(&dir));

    let err = crawl(config).await.unwrap_err();
    assert!(matches!(
        err,
        CrawlerError::Setup(SetupError::SeedUnreachable(_))
    ));
}

#[tokio::test]
async fn test_unwritable_output_is_setup_error() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("missing-dir").join("reviews.csv");
    let config = create_test_config("http://127.0.0.1:9/hotels/".to_string(), &out);

    let err = Coordinator::new(config).err().expect("Expected a setup error");
    assert!(matches!(
        err,
        CrawlerError::Setup(SetupError::OutputUnavailable { .. })
    ));
}

#[tokio::test]
async fn test_follows_listing_and_review_pagination() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/hotels/",
        listing_html(&[("/reviews/hotel_a/", "Hotel A")], Some("/hotels/2/")),
    )
    .await;
    // Page 2 links back to page 1: loop protection must stop here
    mount_html(
        &server,
        "/hotels/2/",
        listing_html(&[("/reviews/hotel_b/", "Hotel B")], Some("/hotels/")),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/reviews/hotel_a/"))
        .and(query_param("page", "2"))
        .respond_with(html(hotel_html("Hotel A", &[("2", "Second page")], None)))
        .mount(&server)
        .await;
    mount_html(
        &server,
        "/reviews/hotel_a/",
        hotel_html("Hotel A", &[("4", "First page")], Some("?page=2")),
    )
    .await;
    mount_html(
        &server,
        "/reviews/hotel_b/",
        hotel_html("Hotel B", &[("4,5", "Only page")], None),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let out = csv_path(&dir);
    let report = run(create_test_config(format!("{}/hotels/", server.uri()), &out)).await;

    let rows = read_rows(&out);
    let summary: Vec<(&str, &str)> = rows
        .iter()
        .map(|r| (r[0].as_str(), r[3].as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("hotel_a", "First page"),
            ("hotel_a", "Second page"),
            ("hotel_b", "Only page"),
        ]
    );
    assert_eq!(rows[2][2], "4.5");
    assert_eq!(report.stats.listing_pages, 2);
    assert_eq!(report.stats.review_pages, 3);
}

#[tokio::test]
async fn test_listing_template_fallback_after_failed_page() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/hotels/",
        listing_html(&[("/reviews/hotel_a/", "Hotel A")], Some("/hotels/2/")),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/hotels/2/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_html(
        &server,
        "/hotels/3/",
        listing_html(&[("/reviews/hotel_c/", "Hotel C")], None),
    )
    .await;
    mount_html(
        &server,
        "/reviews/hotel_a/",
        hotel_html("Hotel A", &[("5", "A")], None),
    )
    .await;
    mount_html(
        &server,
        "/reviews/hotel_c/",
        hotel_html("Hotel C", &[("1", "C")], None),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let out = csv_path(&dir);
    let mut config = create_test_config(format!("{}/hotels/", server.uri()), &out);
    config.crawler.listing_page_template = Some("{seed}{page}/".to_string());

    let report = run(config).await;

    let ids: Vec<String> = read_rows(&out).into_iter().map(|r| r[0].clone()).collect();
    assert_eq!(ids, vec!["hotel_a", "hotel_c"]);
    assert_eq!(report.stats.units_skipped, 1);
}

#[tokio::test]
async fn test_robots_txt_respect() {
    let server = MockServer::start().await;
    mount_two_hotel_site(&server).await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /reviews/hotel_b/"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let out = csv_path(&dir);
    let mut config = create_test_config(format!("{}/hotels/", server.uri()), &out);
    config.crawler.respect_robots = true;

    let report = run(config).await;

    let rows = read_rows(&out);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], "hotel_a");
    assert_eq!(report.stats.disallowed, 1);
}

#[tokio::test]
async fn test_review_caps() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/hotels/",
        listing_html(
            &[
                ("/reviews/hotel_a/", "Hotel A"),
                ("/reviews/hotel_b/", "Hotel B"),
            ],
            None,
        ),
    )
    .await;
    mount_html(
        &server,
        "/reviews/hotel_a/",
        hotel_html("Hotel A", &[("5", "a1"), ("4", "a2"), ("3", "a3")], None),
    )
    .await;
    mount_html(
        &server,
        "/reviews/hotel_b/",
        hotel_html("Hotel B", &[("5", "b1"), ("4", "b2"), ("3", "b3")], None),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let out = csv_path(&dir);
    let mut config = create_test_config(format!("{}/hotels/", server.uri()), &out);
    config.crawler.max_reviews_per_hotel = Some(2);
    config.crawler.max_reviews = Some(3);

    let report = run(config).await;

    let texts: Vec<String> = read_rows(&out).into_iter().map(|r| r[3].clone()).collect();
    assert_eq!(texts, vec!["a1", "a2", "b1"]);
    assert!(report.cap_reached);
}

#[tokio::test]
async fn test_out_of_range_rating_is_dropped() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/hotels/",
        listing_html(&[("/reviews/hotel_a/", "Hotel A")], None),
    )
    .await;
    mount_html(
        &server,
        "/reviews/hotel_a/",
        hotel_html("Hotel A", &[("10", "Too high"), ("0", "Too low"), ("1", "Ok")], None),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let out = csv_path(&dir);
    let report = run(create_test_config(format!("{}/hotels/", server.uri()), &out)).await;

    let rows = read_rows(&out);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][3], "Ok");
    assert_eq!(report.stats.reviews_invalid, 2);
}
