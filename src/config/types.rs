use serde::Deserialize;

/// Main configuration structure for a crawl run
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    pub crawl: CrawlSettings,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
}

impl CrawlConfig {
    /// Creates a configuration with default bounds for the given seeds
    ///
    /// # Example
    ///
    /// ```
    /// use ripple_crawl::config::CrawlConfig;
    ///
    /// let mut config = CrawlConfig::new("docs", vec!["https://example.com/".to_string()]);
    /// config.crawl.max_depth = 2;
    /// assert_eq!(config.crawl.concurrency, 2);
    /// ```
    pub fn new(name: impl Into<String>, seeds: Vec<String>) -> Self {
        Self {
            crawl: CrawlSettings {
                name: name.into(),
                seeds,
                ..CrawlSettings::default()
            },
            filter: FilterConfig::default(),
            fetch: FetchConfig::default(),
            user_agent: UserAgentConfig::default(),
        }
    }
}

/// Crawl bounds and scheduling
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlSettings {
    /// Human-readable name of this crawl
    pub name: String,

    /// Seed URLs the frontier starts from (depth 0)
    pub seeds: Vec<String>,

    /// Maximum link depth from a seed; 0 means unbounded
    #[serde(default)]
    pub max_depth: u32,

    /// Maximum number of pages successfully processed in one run
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Number of concurrent workers
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Delay each worker waits between consecutive fetches (milliseconds)
    #[serde(default = "default_politeness_delay")]
    pub politeness_delay: u64,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            seeds: Vec::new(),
            max_depth: 0,
            max_pages: default_max_pages(),
            concurrency: default_concurrency(),
            politeness_delay: default_politeness_delay(),
        }
    }
}

/// URL admission patterns
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FilterConfig {
    /// If set, only URLs matching this regex are admitted
    #[serde(default)]
    pub url_pattern: Option<String>,

    /// If set, URLs matching this regex are never admitted
    #[serde(default)]
    pub exclude_pattern: Option<String>,
}

/// Fetch behaviour
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FetchConfig {
    /// Per-request timeout (milliseconds)
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_true")]
    pub follow_redirects: bool,

    /// Consult robots.txt before fetching
    #[serde(default = "default_true")]
    pub respect_robots: bool,

    /// Keep bodies of non-textual responses in page records
    #[serde(default)]
    pub include_binary: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            follow_redirects: true,
            respect_robots: true,
            include_binary: false,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler, also the robots.txt product token
    #[serde(default = "default_crawler_name")]
    pub crawler_name: String,

    #[serde(default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(default)]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value
    ///
    /// Format: `CrawlerName/Version` or `CrawlerName/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: None,
        }
    }
}

fn default_max_pages() -> u32 {
    100
}

fn default_concurrency() -> u32 {
    2
}

fn default_politeness_delay() -> u64 {
    1000
}

fn default_timeout() -> u64 {
    30_000
}

fn default_true() -> bool {
    true
}

fn default_crawler_name() -> String {
    "RippleCrawl".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
