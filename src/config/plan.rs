//! Compiled, immutable per-run configuration

use crate::config::types::CrawlConfig;
use crate::config::validation::validate;
use crate::crawler::FetchOptions;
use crate::url::{normalize_url, UrlFilter};
use crate::{ConfigError, ConfigResult};
use std::time::Duration;
use url::Url;

/// Everything a crawl run needs, validated and pre-compiled
///
/// A plan is built once at `start()` and shared read-only by every worker
/// for the lifetime of the run.
#[derive(Debug, Clone)]
pub struct CrawlPlan {
    pub name: String,
    pub seeds: Vec<Url>,
    /// 0 means unbounded
    pub max_depth: u32,
    pub max_pages: u64,
    pub concurrency: usize,
    pub politeness_delay: Duration,
    pub filter: UrlFilter,
    pub fetch: FetchOptions,
    pub respect_robots: bool,
    pub include_binary: bool,
}

impl CrawlPlan {
    /// Validates `config` and compiles it into a plan
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlPlan)` - The configuration is valid
    /// * `Err(ConfigError)` - Any bound, URL, or pattern is invalid
    pub fn compile(config: &CrawlConfig) -> ConfigResult<Self> {
        validate(config)?;

        let filter = UrlFilter::compile(
            config.filter.url_pattern.as_deref(),
            config.filter.exclude_pattern.as_deref(),
        )?;

        let seeds = config
            .crawl
            .seeds
            .iter()
            .map(|seed| {
                normalize_url(seed).map_err(|e| {
                    ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: config.crawl.name.clone(),
            seeds,
            max_depth: config.crawl.max_depth,
            max_pages: u64::from(config.crawl.max_pages),
            concurrency: config.crawl.concurrency as usize,
            politeness_delay: Duration::from_millis(config.crawl.politeness_delay),
            filter,
            fetch: FetchOptions {
                timeout: Duration::from_millis(config.fetch.timeout),
                user_agent: config.user_agent.header_value(),
                follow_redirects: config.fetch.follow_redirects,
            },
            respect_robots: config.fetch.respect_robots,
            include_binary: config.fetch.include_binary,
        })
    }

    /// Whether links found at `depth` should be followed
    pub fn follows_links_at(&self, depth: u32) -> bool {
        self.max_depth == 0 || depth < self.max_depth
    }
}
