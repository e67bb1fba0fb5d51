//! HTTP fetcher
//!
//! One call is one network round trip: no retries, no pacing. Both live in
//! the coordinator ([`super::retry`] and [`super::pacer`]). The fetcher only
//! classifies what came back.

use crate::config::Config;
use crate::crawler::retry::{RetryDecision, Retryable};
use crate::SetupError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use url::Url;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// How a fetch failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request did not complete within the configured timeout
    Timeout,
    /// The server answered with a non-success status
    Http,
    /// Connection, TLS, redirect or body read failure
    Network,
    /// The site refused us: 403/429/503 or a block page
    Blocked,
    /// A successful response that is not an HTML document
    NotHtml,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Timeout => "timeout",
            Self::Http => "HTTP error",
            Self::Network => "network error",
            Self::Blocked => "blocked",
            Self::NotHtml => "not HTML",
        };
        f.write_str(name)
    }
}

/// A failed fetch of one URL
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} for {url}: {message}")]
pub struct FetchFailure {
    pub kind: FailureKind,
    pub url: String,
    /// Set when the failure was triggered by a response status
    pub status_code: Option<u16>,
    pub message: String,
}

impl FetchFailure {
    fn new(kind: FailureKind, url: &Url, status_code: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.to_string(),
            status_code,
            message: message.into(),
        }
    }

    fn from_reqwest(url: &Url, error: reqwest::Error) -> Self {
        let kind = if error.is_timeout() {
            FailureKind::Timeout
        } else {
            FailureKind::Network
        };
        Self::new(kind, url, None, error.to_string())
    }
}

impl Retryable for FetchFailure {
    fn retry_decision(&self) -> RetryDecision {
        match self.kind {
            FailureKind::Timeout | FailureKind::Network => RetryDecision::Backoff,
            FailureKind::Blocked => RetryDecision::Cooldown,
            FailureKind::NotHtml => RetryDecision::Stop,
            FailureKind::Http => match self.status_code {
                Some(code) if code >= 500 || code == 408 => RetryDecision::Backoff,
                _ => RetryDecision::Stop,
            },
        }
    }
}

/// Builds the HTTP client used for the whole run
///
/// Identifies as `Name/Version (+contact-url; contact-email)` unless the
/// config carries a full User-Agent override. Redirects are followed up to
/// 10 hops.
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(config.crawler.timeout);

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    match HeaderValue::from_str(&config.user_agent.accept_language) {
        Ok(value) => {
            headers.insert(ACCEPT_LANGUAGE, value);
        }
        Err(_) => tracing::warn!(
            "Ignoring invalid accept-language '{}'",
            config.user_agent.accept_language
        ),
    }

    Client::builder()
        .user_agent(config.user_agent.header_value())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages and counts what it sees
#[derive(Debug)]
pub struct Fetcher {
    client: Client,
    /// Lowercase fragments that mark a body as a block page
    block_markers: Vec<String>,
    requests: AtomicU64,
    blocked: AtomicU64,
}

impl Fetcher {
    pub fn new(config: &Config) -> Result<Self, SetupError> {
        Ok(Self {
            client: build_http_client(config)?,
            block_markers: config
                .crawler
                .block_markers
                .iter()
                .map(|m| m.to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
            requests: AtomicU64::new(0),
            blocked: AtomicU64::new(0),
        })
    }

    /// Fetches an HTML page
    ///
    /// Fails with `NotHtml` when a `Content-Type` header is present and does
    /// not name an HTML type, and with `Blocked` when the body contains one of
    /// the configured block markers.
    pub async fn fetch(&self, url: &Url) -> Result<String, FetchFailure> {
        self.get(url, true).await
    }

    /// Fetches a resource as plain text without HTML checks (robots.txt)
    pub async fn fetch_text(&self, url: &Url) -> Result<String, FetchFailure> {
        self.get(url, false).await
    }

    /// Requests sent so far, including failed ones
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Responses classified as blocked so far
    pub fn blocked_count(&self) -> u64 {
        self.blocked.load(Ordering::Relaxed)
    }

    async fn get(&self, url: &Url, expect_html: bool) -> Result<String, FetchFailure> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchFailure::from_reqwest(url, e))?;

        let status = response.status();
        if is_block_status(status) {
            self.blocked.fetch_add(1, Ordering::Relaxed);
            return Err(FetchFailure::new(
                FailureKind::Blocked,
                url,
                Some(status.as_u16()),
                format!("HTTP {}", status),
            ));
        }

        if !status.is_success() {
            return Err(FetchFailure::new(
                FailureKind::Http,
                url,
                Some(status.as_u16()),
                format!("HTTP {}", status),
            ));
        }

        if expect_html {
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_ascii_lowercase);

            if let Some(content_type) = content_type {
                if !content_type.contains("html") {
                    return Err(FetchFailure::new(
                        FailureKind::NotHtml,
                        url,
                        None,
                        format!("Content-Type is {}", content_type),
                    ));
                }
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchFailure::from_reqwest(url, e))?;

        if expect_html {
            if let Some(marker) = self.block_marker_in(&body) {
                self.blocked.fetch_add(1, Ordering::Relaxed);
                return Err(FetchFailure::new(
                    FailureKind::Blocked,
                    url,
                    None,
                    format!("block marker '{}' in page body", marker),
                ));
            }
        }

        Ok(body)
    }

    fn block_marker_in(&self, body: &str) -> Option<&str> {
        if self.block_markers.is_empty() {
            return None;
        }
        let lower = body.to_lowercase();
        self.block_markers
            .iter()
            .find(|marker| lower.contains(marker.as_str()))
            .map(String::as_str)
    }
}

fn is_block_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE
    )
}
