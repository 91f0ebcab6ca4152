use crate::config::types::{CrawlConfig, CrawlSettings, FetchConfig, FilterConfig, UserAgentConfig};
use crate::{ConfigError, ConfigResult};
use regex::Regex;
use url::Url;

/// Upper bound on concurrent workers
pub const MAX_CONCURRENCY: u32 = 10;

/// Validates the entire configuration
pub fn validate(config: &CrawlConfig) -> ConfigResult<()> {
    validate_crawl_settings(&config.crawl)?;
    validate_filter_config(&config.filter)?;
    validate_fetch_config(&config.fetch)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates crawl bounds and seeds
fn validate_crawl_settings(config: &CrawlSettings) -> ConfigResult<()> {
    if config.name.trim().is_empty() {
        return Err(ConfigError::Validation("name cannot be empty".to_string()));
    }

    if config.seeds.is_empty() {
        return Err(ConfigError::Validation(
            "at least one seed URL is required".to_string(),
        ));
    }

    for seed in &config.seeds {
        validate_seed_url(seed)?;
    }

    // max_depth >= 0 and politeness_delay >= 0 always hold for unsigned types

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.concurrency < 1 || config.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }

    Ok(())
}

/// Validates a single seed URL: absolute, http(s), with a host
fn validate_seed_url(seed: &str) -> ConfigResult<()> {
    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' must use http or https",
            seed
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' has no host",
            seed
        )));
    }

    Ok(())
}

/// Validates include/exclude patterns by compiling them
fn validate_filter_config(config: &FilterConfig) -> ConfigResult<()> {
    if let Some(pattern) = &config.url_pattern {
        validate_pattern("url_pattern", pattern)?;
    }
    if let Some(pattern) = &config.exclude_pattern {
        validate_pattern("exclude_pattern", pattern)?;
    }
    Ok(())
}

fn validate_pattern(field: &str, pattern: &str) -> ConfigResult<()> {
    Regex::new(pattern)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidPattern(format!("{} '{}': {}", field, pattern, e)))
}

fn validate_fetch_config(config: &FetchConfig) -> ConfigResult<()> {
    if config.timeout == 0 {
        return Err(ConfigError::Validation(
            "timeout must be >= 1ms".to_string(),
        ));
    }
    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumerics, '-', '_' or '.', got '{}'",
            config.crawler_name
        )));
    }

    if let Some(contact) = &config.contact_url {
        Url::parse(contact)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}
