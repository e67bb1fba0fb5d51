//! robots.txt rules for one origin
//!
//! Allow/disallow matching is delegated to the robotstxt crate. `Crawl-delay`
//! is not part of the matcher, so it is read from the groups directly.

use robotstxt::DefaultMatcher;
use std::time::Duration;
use url::Url;

/// The robots.txt rules of one origin
#[derive(Debug, Clone, PartialEq)]
pub struct RobotsRules {
    /// Raw robots.txt body; `None` means everything is allowed
    body: Option<String>,
}

impl RobotsRules {
    /// Rules from a fetched robots.txt body
    pub fn from_body(body: &str) -> Self {
        Self {
            body: Some(body.to_string()),
        }
    }

    /// Rules that allow everything
    ///
    /// Used when robots.txt is missing, unreachable, or not being honored.
    pub fn allow_all() -> Self {
        Self { body: None }
    }

    /// Whether `agent` (a product token such as `HotelReviewCrawler`) may fetch `url`
    pub fn allows(&self, url: &Url, agent: &str) -> bool {
        match &self.body {
            Some(body) if !body.trim().is_empty() => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(body, agent, url.as_str())
            }
            _ => true,
        }
    }

    /// The `Crawl-delay` that applies to `agent`, if any
    ///
    /// A group naming the agent wins over the `*` group. Agent names match
    /// case-insensitively.
    pub fn crawl_delay(&self, agent: &str) -> Option<Duration> {
        let body = self.body.as_deref()?;
        let agent = agent.to_lowercase();

        let mut group_agents: Vec<String> = Vec::new();
        let mut in_agent_lines = false;
        let mut for_agent = None;
        let mut for_wildcard = None;

        for line in body.lines() {
            let line = line.split('#').next().unwrap_or_default().trim();
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            if key == "user-agent" {
                // A user-agent line after any rule starts a new group
                if !in_agent_lines {
                    group_agents.clear();
                    in_agent_lines = true;
                }
                group_agents.push(value.to_lowercase());
                continue;
            }
            in_agent_lines = false;

            if key != "crawl-delay" {
                continue;
            }
            // Negative, NaN and out-of-range values are ignored
            let Some(delay) = value
                .parse::<f64>()
                .ok()
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            else {
                continue;
            };

            if group_agents.iter().any(|ua| ua == &agent) {
                for_agent = Some(delay);
            } else if group_agents.iter().any(|ua| ua == "*") {
                for_wildcard = Some(delay);
            }
        }

        for_agent.or(for_wildcard)
    }
}
