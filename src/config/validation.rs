use crate::config::types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use crate::model::RatingScale;
use crate::parser::CompiledRules;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_rating_scale(&config.rating)?;

    // Selectors are compiled again by the coordinator; compiling here surfaces
    // typos before any request is made.
    CompiledRules::compile(&config.selectors)?;

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.seeds.is_empty() {
        return Err(ConfigError::Validation(
            "at least one seed URL is required".to_string(),
        ));
    }

    for seed in &config.seeds {
        let url = Url::parse(seed).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Seed URL '{}' must use the http or https scheme",
                seed
            )));
        }
    }

    if config.request_delay < 100 {
        return Err(ConfigError::Validation(format!(
            "request_delay must be >= 100ms, got {}ms",
            config.request_delay
        )));
    }

    if config.timeout < 1 {
        return Err(ConfigError::Validation(
            "timeout must be at least 1 second".to_string(),
        ));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    if let Some(template) = &config.listing_page_template {
        if !template.contains("{page}") {
            return Err(ConfigError::Validation(format!(
                "listing_page_template '{}' must contain a {{page}} placeholder",
                template
            )));
        }
    }

    if config.max_listing_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max_listing_pages must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if let Some(full) = &config.override_string {
        if full.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user-agent override cannot be empty".to_string(),
            ));
        }
        return Ok(());
    }

    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.csv_path.is_empty() {
        return Err(ConfigError::Validation(
            "csv_path cannot be empty".to_string(),
        ));
    }

    if let Some(summary) = &config.summary_path {
        if summary.is_empty() {
            return Err(ConfigError::Validation(
                "summary_path cannot be empty when set".to_string(),
            ));
        }
        if summary == &config.csv_path {
            return Err(ConfigError::Validation(
                "summary_path must differ from csv_path".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates the rating scale bounds
fn validate_rating_scale(scale: &RatingScale) -> Result<(), ConfigError> {
    if !scale.min.is_finite() || !scale.max.is_finite() || scale.min >= scale.max {
        return Err(ConfigError::Validation(format!(
            "rating scale must satisfy min < max, got {}..={}",
            scale.min, scale.max
        )));
    }
    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let (local, domain) = email.split_once('@').ok_or_else(|| {
        ConfigError::Validation(format!("Invalid email format: '{}'", email))
    })?;

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
