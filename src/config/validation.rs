use crate::config::types::{CatalogConfig, Config, HttpConfig, LayoutConfig, RetryConfig};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_catalog_config(&config.catalog)?;
    validate_retry_config(&config.retry)?;
    validate_layout_config(&config.layout)?;
    validate_http_config(&config.http)?;
    Ok(())
}

/// Validates the crawl target and page range
fn validate_catalog_config(config: &CatalogConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.category_url).map_err(|e| {
        ConfigError::InvalidUrl(format!(
            "Invalid category_url '{}': {}",
            config.category_url, e
        ))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "category_url '{}' must use HTTP or HTTPS",
            config.category_url
        )));
    }

    if config.start_page < 1 {
        return Err(ConfigError::Validation(
            "start_page must be >= 1".to_string(),
        ));
    }

    if config.end_page < config.start_page {
        return Err(ConfigError::Validation(format!(
            "end_page ({}) must not be lower than start_page ({})",
            config.end_page, config.start_page
        )));
    }

    if config.workers < 1 || config.workers > 64 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 64, got {}",
            config.workers
        )));
    }

    Ok(())
}

/// Validates backoff settings
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.backoff_cap_secs < config.backoff_step_secs {
        return Err(ConfigError::Validation(format!(
            "backoff_cap_secs ({}) must be >= backoff_step_secs ({})",
            config.backoff_cap_secs, config.backoff_step_secs
        )));
    }

    if config.fetch_deadline_secs == Some(0) {
        return Err(ConfigError::Validation(
            "fetch_deadline_secs must be > 0 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates that every selector compiles
fn validate_layout_config(config: &LayoutConfig) -> Result<(), ConfigError> {
    for selector in [
        &config.heading,
        &config.cover_image,
        &config.genres,
        &config.comments,
        &config.text_link,
        &config.book_links,
    ] {
        parse_selector(selector)?;
    }

    if config.title_delimiter.is_empty() {
        return Err(ConfigError::Validation(
            "title_delimiter cannot be empty".to_string(),
        ));
    }

    if config.text_link_label.trim().is_empty() {
        return Err(ConfigError::Validation(
            "text_link_label cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates HTTP client settings
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 || config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "HTTP timeouts must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Compiles a CSS selector, mapping failures to a config error
pub(crate) fn parse_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector)
        .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))
}
