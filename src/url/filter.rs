use crate::{ConfigError, ConfigResult};
use regex::Regex;

/// Include/exclude URL patterns compiled once per run
///
/// An empty filter admits every URL.
#[derive(Debug, Clone, Default)]
pub struct UrlFilter {
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl UrlFilter {
    /// Compiles the optional include and exclude patterns
    ///
    /// Malformed patterns surface here, at configuration time, never at
    /// admission time.
    pub fn compile(include: Option<&str>, exclude: Option<&str>) -> ConfigResult<Self> {
        let compile = |field: &str, pattern: &str| {
            Regex::new(pattern).map_err(|e| {
                ConfigError::InvalidPattern(format!("{} '{}': {}", field, pattern, e))
            })
        };

        Ok(Self {
            include: include.map(|p| compile("url_pattern", p)).transpose()?,
            exclude: exclude.map(|p| compile("exclude_pattern", p)).transpose()?,
        })
    }

    /// Returns true if the URL passes both patterns
    ///
    /// # Examples
    ///
    /// ```
    /// use ripple_crawl::url::UrlFilter;
    ///
    /// let filter = UrlFilter::compile(Some("^https://example\\.com/"), Some("\\.png$")).unwrap();
    /// assert!(filter.matches("https://example.com/docs"));
    /// assert!(!filter.matches("https://example.com/logo.png"));
    /// assert!(!filter.matches("https://other.com/docs"));
    /// ```
    pub fn matches(&self, url: &str) -> bool {
        if let Some(include) = &self.include {
            if !include.is_match(url) {
                return false;
            }
        }

        if let Some(exclude) = &self.exclude {
            if exclude.is_match(url) {
                return false;
            }
        }

        true
    }

    /// Returns true if neither pattern is configured
    pub fn is_empty(&self) -> bool {
        self.include.is_none() && self.exclude.is_none()
    }
}
