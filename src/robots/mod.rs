//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching robots.txt
//! files, and answers allow/deny queries for candidate URLs.

mod cache;
mod parser;

pub use cache::RobotsCache;
pub use parser::{RobotsPolicy, MAX_CRAWL_DELAY_MS};

use crate::crawler::{FetchOptions, Fetcher};
use crate::url::extract_origin;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Resolves robots.txt policies per origin, fetching each at most once
///
/// A missing or unreachable robots.txt (transport failure or any non-2xx
/// status) is cached as allow-all.
pub struct RobotsResolver {
    fetcher: Arc<dyn Fetcher>,
    options: FetchOptions,
    cache: RobotsCache,
}

impl RobotsResolver {
    /// Creates a resolver that fetches robots.txt with the crawl's own
    /// user agent and timeout
    pub fn new(fetcher: Arc<dyn Fetcher>, options: FetchOptions) -> Self {
        Self {
            fetcher,
            options,
            cache: RobotsCache::new(),
        }
    }

    /// Checks if a URL may be crawled
    ///
    /// # Returns
    ///
    /// * `true` - If the URL is allowed (or its robots.txt is unavailable)
    /// * `false` - If the URL is disallowed, or is not a crawlable URL at all
    pub async fn is_allowed(&self, url: &str) -> bool {
        let parsed = match Url::parse(url) {
            Ok(u) => u,
            Err(e) => {
                tracing::debug!("Denying malformed URL {}: {}", url, e);
                return false;
            }
        };

        let Some(policy) = self.policy_for(&parsed).await else {
            tracing::debug!("Denying URL without origin: {}", url);
            return false;
        };

        let allowed = policy.is_allowed_path(&path_and_query(&parsed));
        if !allowed {
            tracing::debug!("URL {} disallowed by robots.txt", url);
        }
        allowed
    }

    /// Gets the policy for a URL's origin, fetching robots.txt on first use
    pub async fn policy_for(&self, url: &Url) -> Option<Arc<RobotsPolicy>> {
        let origin = extract_origin(url)?;

        if let Some(policy) = self.cache.get(&origin).await {
            tracing::trace!("Using cached robots.txt for {}", origin);
            return Some(policy);
        }

        let policy = self.fetch_policy(&origin).await;
        Some(self.cache.insert(&origin, policy).await)
    }

    /// The cached crawl delay for a URL's origin; zero if none is cached
    pub async fn crawl_delay(&self, url: &Url) -> Duration {
        let Some(origin) = extract_origin(url) else {
            return Duration::ZERO;
        };

        self.cache
            .get(&origin)
            .await
            .map(|policy| Duration::from_millis(policy.crawl_delay_ms))
            .unwrap_or(Duration::ZERO)
    }

    /// Number of origins resolved so far
    pub async fn cached_origins(&self) -> usize {
        self.cache.len().await
    }

    async fn fetch_policy(&self, origin: &str) -> RobotsPolicy {
        let robots_url = format!("{}/robots.txt", origin);
        tracing::debug!("Fetching robots.txt: {}", robots_url);

        match self.fetcher.fetch(&robots_url, &self.options).await {
            Ok(response) if response.is_success() => {
                let content = String::from_utf8_lossy(&response.body);
                RobotsPolicy::parse(&content, &self.options.user_agent)
            }
            Ok(response) => {
                tracing::debug!(
                    "robots.txt for {} returned HTTP {}, allowing all",
                    origin,
                    response.status
                );
                RobotsPolicy::allow_all()
            }
            Err(e) => {
                tracing::debug!("robots.txt for {} unavailable ({}), allowing all", origin, e);
                RobotsPolicy::allow_all()
            }
        }
    }
}

fn path_and_query(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}
